//! Scripted expert runtime for tests

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::message::{ContentBlock, StreamMessage};
use super::runtime::{ExpertRuntime, ExpertStream};
use super::types::DelegationRequest;

/// In-memory log writer shared with a test subscriber
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn assistant(content: Vec<ContentBlock>) -> StreamMessage {
    StreamMessage::Assistant { content }
}

pub(crate) fn result(payload: Value) -> StreamMessage {
    match payload {
        Value::Object(payload) => StreamMessage::Result { payload },
        other => panic!("result payload must be an object, got {}", other),
    }
}

pub(crate) fn tool_use(name: &str, input: Value) -> ContentBlock {
    ContentBlock::ToolUse {
        id: format!("toolu_{}", name.to_lowercase()),
        name: name.to_string(),
        input,
    }
}

/// Stream that replays a fixed script and counts close calls
pub(crate) struct ScriptedStream {
    items: VecDeque<Result<StreamMessage>>,
    close_calls: Arc<AtomicUsize>,
}

impl ScriptedStream {
    pub(crate) fn new(items: Vec<Result<StreamMessage>>) -> Self {
        Self::with_counter(items, Arc::new(AtomicUsize::new(0)))
    }

    pub(crate) fn with_counter(
        items: Vec<Result<StreamMessage>>,
        close_calls: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            items: items.into(),
            close_calls,
        }
    }
}

#[async_trait]
impl ExpertStream for ScriptedStream {
    async fn next_message(&mut self) -> Option<Result<StreamMessage>> {
        self.items.pop_front()
    }

    async fn close(&mut self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Runtime handing out one scripted stream and recording the request
pub(crate) struct ScriptedRuntime {
    script: Mutex<Option<Vec<Result<StreamMessage>>>>,
    pub(crate) close_calls: Arc<AtomicUsize>,
    pub(crate) requests: Mutex<Vec<DelegationRequest>>,
}

impl ScriptedRuntime {
    pub(crate) fn new(script: Vec<Result<StreamMessage>>) -> Self {
        Self {
            script: Mutex::new(Some(script)),
            close_calls: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn opens(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ExpertRuntime for ScriptedRuntime {
    async fn open(&self, request: &DelegationRequest) -> Result<Box<dyn ExpertStream>> {
        tracing::info!("scripted runtime opened");
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .script
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow::anyhow!("scripted runtime opened twice"))?;
        Ok(Box::new(ScriptedStream::with_counter(
            script,
            self.close_calls.clone(),
        )))
    }
}
