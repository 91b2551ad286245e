//! Stream classification and result aggregation.
//!
//! Consumes `StreamMessage`s strictly in arrival order and:
//! - Logs each message and its content blocks
//! - Emits a notice for every skill or tool the expert uses
//! - Keeps the most recent terminal result
//!
//! The stream is drained to its natural end; a terminal result does not stop
//! consumption.

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info};

use super::message::{ContentBlock, StreamMessage};
use super::notice::{DelegationNotice, NoticeSink};
use super::preview::preview;
use super::runtime::ExpertStream;
use super::types::DelegationResult;
use crate::constants::logging::PREVIEW_LIMIT;

/// Running state of one delegation's stream
pub struct StreamAggregator<'a> {
    notices: &'a dyn NoticeSink,
    message_count: usize,
    last_result: Option<DelegationResult>,
}

impl<'a> StreamAggregator<'a> {
    pub fn new(notices: &'a dyn NoticeSink) -> Self {
        Self {
            notices,
            message_count: 0,
            last_result: None,
        }
    }

    /// Number of messages processed so far
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    /// Consume the aggregator, yielding the latest terminal result
    pub fn into_result(self) -> Option<DelegationResult> {
        self.last_result
    }

    /// Pull messages until the stream ends. A stream error is returned as-is;
    /// closing the stream is the caller's job.
    pub async fn drain(&mut self, stream: &mut dyn ExpertStream) -> Result<()> {
        while let Some(message) = stream.next_message().await {
            self.process(message?);
        }
        Ok(())
    }

    /// Classify and record a single message
    pub fn process(&mut self, message: StreamMessage) {
        self.message_count += 1;
        info!(
            "Received message #{}: {}",
            self.message_count,
            message.kind()
        );

        match message {
            StreamMessage::Assistant { content } => {
                debug!("   Content blocks: {}", content.len());
                for block in &content {
                    self.process_block(block);
                }
            }
            StreamMessage::Result { payload } => {
                info!("Received result message - task complete!");
                debug!(
                    "   Result keys: {:?}",
                    payload.keys().map(String::as_str).collect::<Vec<_>>()
                );
                self.last_result = Some(payload);
            }
            StreamMessage::Other { .. } => {}
        }
    }

    fn process_block(&self, block: &ContentBlock) {
        if let Some(skill) = block.skill_name() {
            info!("  Using Skill: {}", skill);
            if let ContentBlock::ToolUse { input, .. } = block {
                debug!("     Skill input: {}", input);
            }
            self.notices.notify(DelegationNotice::Skill {
                name: skill.to_string(),
            });
            return;
        }

        match block {
            ContentBlock::ToolUse { name, input, .. } => {
                info!("  Using Tool: {}", name);
                if !is_empty_input(input) {
                    let rendered = input.to_string();
                    debug!("     Tool input: {}", preview(&rendered, PREVIEW_LIMIT));
                }
                self.notices.notify(DelegationNotice::Tool { name: name.clone() });
            }
            ContentBlock::Text { text } => log_block_text(block.kind(), Some(text)),
            ContentBlock::Other { kind, text } => log_block_text(kind, text.as_ref()),
        }
    }
}

fn log_block_text(kind: &str, text: Option<&String>) {
    match text.filter(|t| !t.is_empty()) {
        Some(text) => debug!("   [{}] {}", kind, preview(text, PREVIEW_LIMIT)),
        None => debug!("   [{}]", kind),
    }
}

fn is_empty_input(input: &Value) -> bool {
    match input {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegation::testing::{assistant, result, tool_use, ScriptedStream};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn drain_notices(rx: &mut mpsc::UnboundedReceiver<DelegationNotice>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            out.push(notice.to_string());
        }
        out
    }

    #[tokio::test]
    async fn keeps_latest_terminal_result() {
        let (tx, _rx) = mpsc::unbounded_channel::<DelegationNotice>();
        let mut aggregator = StreamAggregator::new(&tx);
        let mut stream = ScriptedStream::new(vec![
            Ok(result(json!({"status": "first"}))),
            Ok(StreamMessage::Other {
                kind: "system".to_string(),
            }),
            Ok(result(json!({"status": "second"}))),
        ]);

        aggregator.drain(&mut stream).await.unwrap();

        assert_eq!(aggregator.message_count(), 3);
        let result = aggregator.into_result().unwrap();
        assert_eq!(result.get("status"), Some(&json!("second")));
    }

    #[tokio::test]
    async fn keeps_draining_after_result() {
        let (tx, _rx) = mpsc::unbounded_channel::<DelegationNotice>();
        let mut aggregator = StreamAggregator::new(&tx);
        let mut stream = ScriptedStream::new(vec![
            Ok(result(json!({"status": "ok"}))),
            Ok(StreamMessage::Other {
                kind: "system".to_string(),
            }),
        ]);

        aggregator.drain(&mut stream).await.unwrap();
        assert_eq!(aggregator.message_count(), 2);
        assert!(aggregator.into_result().is_some());
    }

    #[tokio::test]
    async fn no_result_is_none() {
        let (tx, _rx) = mpsc::unbounded_channel::<DelegationNotice>();
        let mut aggregator = StreamAggregator::new(&tx);
        let mut stream = ScriptedStream::new(vec![Ok(assistant(vec![ContentBlock::Text {
            text: "thinking out loud".to_string(),
        }]))]);

        aggregator.drain(&mut stream).await.unwrap();
        assert_eq!(aggregator.message_count(), 1);
        assert!(aggregator.into_result().is_none());
    }

    #[tokio::test]
    async fn empty_stream_counts_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel::<DelegationNotice>();
        let mut aggregator = StreamAggregator::new(&tx);
        let mut stream = ScriptedStream::new(vec![]);

        aggregator.drain(&mut stream).await.unwrap();

        assert_eq!(aggregator.message_count(), 0);
        assert!(drain_notices(&mut rx).is_empty());
        assert!(aggregator.into_result().is_none());
    }

    #[tokio::test]
    async fn stream_error_stops_drain() {
        let (tx, _rx) = mpsc::unbounded_channel::<DelegationNotice>();
        let mut aggregator = StreamAggregator::new(&tx);
        let mut stream = ScriptedStream::new(vec![
            Ok(result(json!({"status": "ok"}))),
            Err(anyhow::anyhow!("expert crashed")),
            Ok(result(json!({"status": "never"}))),
        ]);

        let err = aggregator.drain(&mut stream).await.unwrap_err();
        assert_eq!(err.to_string(), "expert crashed");
        assert_eq!(aggregator.message_count(), 1);
    }

    #[test]
    fn notices_follow_block_order() {
        let (tx, mut rx) = mpsc::unbounded_channel::<DelegationNotice>();
        let mut aggregator = StreamAggregator::new(&tx);

        aggregator.process(assistant(vec![
            tool_use("Skill", json!({"skill": "xlsx"})),
            ContentBlock::Text {
                text: "x".repeat(500),
            },
            tool_use("Bash", json!({"command": "ls -la"})),
            tool_use("Skill", json!({"args": "no name"})),
            tool_use("Read", Value::Null),
        ]));

        assert_eq!(
            drain_notices(&mut rx),
            vec![
                "Using the skill: xlsx",
                "Using the tool: Bash",
                "Using the skill: unknown",
                "Using the tool: Read",
            ]
        );
    }

    #[test]
    fn malformed_blocks_do_not_abort() {
        let (tx, mut rx) = mpsc::unbounded_channel::<DelegationNotice>();
        let mut aggregator = StreamAggregator::new(&tx);

        aggregator.process(StreamMessage::from_json(json!({
            "type": "assistant",
            "message": {"content": [{"type": "tool_use"}, {"weird": 1}, {"type": "image"}]}
        })));

        assert_eq!(aggregator.message_count(), 1);
        assert_eq!(drain_notices(&mut rx), vec!["Using the tool: "]);
    }

    #[test]
    fn empty_input_detection() {
        assert!(is_empty_input(&Value::Null));
        assert!(is_empty_input(&json!({})));
        assert!(is_empty_input(&json!([])));
        assert!(!is_empty_input(&json!({"a": 1})));
        assert!(!is_empty_input(&json!(0)));
    }
}
