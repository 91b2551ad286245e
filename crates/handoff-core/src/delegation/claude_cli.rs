//! Claude CLI expert runtime
//!
//! Runs `claude --print --output-format stream-json` as a child process and
//! reads newline-delimited JSON messages from its stdout. Stderr is collected
//! in the background so a failing run can report why.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use super::message::StreamMessage;
use super::preview::preview;
use super::runtime::{ExpertRuntime, ExpertStream};
use super::types::DelegationRequest;
use crate::constants::{env, expert, logging::PREVIEW_LIMIT};
use crate::error::DelegationError;

/// Expert runtime backed by the `claude` command line tool
#[derive(Debug, Clone)]
pub struct ClaudeCliRuntime {
    program: String,
}

impl Default for ClaudeCliRuntime {
    fn default() -> Self {
        Self::new(expert::DEFAULT_PROGRAM)
    }
}

impl ClaudeCliRuntime {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `HANDOFF_EXPERT_CLI` when set, otherwise `claude` from PATH
    pub fn from_env() -> Self {
        std::env::var(env::EXPERT_CLI)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command line arguments for a request
    pub fn build_args(request: &DelegationRequest) -> Result<Vec<String>, DelegationError> {
        if request.preset != expert::PRESET_CLAUDE_CODE {
            return Err(DelegationError::UnsupportedPreset(request.preset.clone()));
        }

        let mut args = vec![
            "--print".to_string(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--permission-mode".to_string(),
            request.permission_mode.as_runtime_str().to_string(),
            "--append-system-prompt".to_string(),
            request.expert_persona.clone(),
        ];
        if !request.setting_sources.is_empty() {
            args.push("--setting-sources".to_string());
            args.push(request.setting_sources.join(","));
        }
        args.push("--".to_string());
        args.push(request.task_prompt.clone());
        Ok(args)
    }
}

#[async_trait]
impl ExpertRuntime for ClaudeCliRuntime {
    async fn open(&self, request: &DelegationRequest) -> Result<Box<dyn ExpertStream>> {
        let args = Self::build_args(request)?;

        tokio::fs::create_dir_all(&request.working_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create working directory {}",
                    request.working_dir.display()
                )
            })?;

        info!(
            "Spawning expert runtime: {} in {}",
            self.program,
            request.working_dir.display()
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .current_dir(&request.working_dir)
            .kill_on_drop(true);

        let stream = CliStream::spawn(cmd, &self.program)?;
        Ok(Box::new(stream))
    }
}

/// Message stream read from a running expert process
pub struct CliStream {
    program: String,
    child: Option<Child>,
    lines: Option<LinesStream<BufReader<ChildStdout>>>,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
    stderr_task: Option<JoinHandle<()>>,
}

impl CliStream {
    /// Spawn a prepared command. Stdout and stderr must be piped.
    pub(crate) fn spawn(mut cmd: Command, program: &str) -> Result<Self> {
        let mut child = cmd.spawn().map_err(|source| DelegationError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("No stdout"))?;
        let stderr = child.stderr.take();

        let stderr_tail = Arc::new(Mutex::new(VecDeque::new()));
        let stderr_task = stderr.map(|stderr| {
            let tail = stderr_tail.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("expert stderr: {}", line);
                    if let Ok(mut tail) = tail.lock() {
                        if tail.len() == expert::STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
            })
        });

        Ok(Self {
            program: program.to_string(),
            child: Some(child),
            lines: Some(LinesStream::new(BufReader::new(stdout).lines())),
            stderr_tail,
            stderr_task,
        })
    }

    fn stderr_summary(&self) -> String {
        self.stderr_tail
            .lock()
            .map(|tail| tail.iter().cloned().collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }

    /// Reap the process after stdout reached EOF
    async fn finish(&mut self) -> Result<()> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };

        let status = child
            .wait()
            .await
            .context("Failed to wait for expert runtime")?;

        if let Some(mut task) = self.stderr_task.take() {
            if tokio::time::timeout(expert::STDERR_DRAIN_TIMEOUT, &mut task)
                .await
                .is_err()
            {
                debug!("Stderr still held open after exit, keeping collected tail");
                task.abort();
            }
        }

        if status.success() {
            debug!("{} exited with {}", self.program, status);
            Ok(())
        } else {
            Err(DelegationError::ExpertExited {
                status: status.to_string(),
                stderr: self.stderr_summary(),
            }
            .into())
        }
    }
}

#[async_trait]
impl ExpertStream for CliStream {
    async fn next_message(&mut self) -> Option<Result<StreamMessage>> {
        loop {
            let lines = self.lines.as_mut()?;

            match lines.next().await {
                Some(Ok(raw)) => {
                    let line = raw.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(line) {
                        Ok(json @ Value::Object(_)) => {
                            return Some(Ok(StreamMessage::from_json(json)));
                        }
                        // Skip non-JSON lines (banners, debug output)
                        _ => debug!("Skipping non-JSON line: {}", preview(line, PREVIEW_LIMIT)),
                    }
                }
                Some(Err(e)) => {
                    self.lines = None;
                    return Some(Err(
                        anyhow::Error::new(e).context("Failed to read expert output")
                    ));
                }
                None => {
                    self.lines = None;
                    return self.finish().await.err().map(Err);
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.lines = None;
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if matches!(child.try_wait(), Ok(None)) {
            debug!("Stopping expert runtime {}", self.program);
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill expert runtime: {}", e);
            }
            child
                .wait()
                .await
                .context("Failed to wait for expert runtime")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpertSettings;
    use crate::delegation::types::PermissionMode;
    use serde_json::json;

    fn request(settings: &ExpertSettings) -> DelegationRequest {
        DelegationRequest::new("Rules\n\nUser Prompt: hi", "You are an expert", settings)
    }

    #[test]
    fn test_build_args() {
        let args = ClaudeCliRuntime::build_args(&request(&ExpertSettings::default())).unwrap();
        assert_eq!(
            args,
            vec![
                "--print",
                "--output-format",
                "stream-json",
                "--verbose",
                "--permission-mode",
                "bypassPermissions",
                "--append-system-prompt",
                "You are an expert",
                "--setting-sources",
                "user,project",
                "--",
                "Rules\n\nUser Prompt: hi",
            ]
        );
    }

    #[test]
    fn test_build_args_restricted() {
        let settings = ExpertSettings::default().with_permission_mode(PermissionMode::Restricted);
        let args = ClaudeCliRuntime::build_args(&request(&settings)).unwrap();
        assert!(args.windows(2).any(|w| w == ["--permission-mode", "default"]));
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let settings = ExpertSettings::default().with_preset("custom");
        let err = ClaudeCliRuntime::build_args(&request(&settings)).unwrap_err();
        assert!(matches!(err, DelegationError::UnsupportedPreset(p) if p == "custom"));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let temp = tempfile::tempdir().unwrap();
        let settings = ExpertSettings::default().with_working_dir(temp.path().join("sandbox"));
        let runtime = ClaudeCliRuntime::new("handoff-no-such-expert-binary");

        let err = match runtime.open(&request(&settings)).await {
            Ok(_) => panic!("expected spawn failure"),
            Err(e) => e,
        };
        assert!(matches!(
            err.downcast_ref::<DelegationError>(),
            Some(DelegationError::Spawn { .. })
        ));
        assert!(temp.path().join("sandbox").is_dir());
    }

    #[cfg(unix)]
    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reads_messages_in_order() {
        let script = r#"
echo 'starting up'
echo '{"type":"system","subtype":"init"}'
echo ''
echo '{"type":"assistant","message":{"content":[{"type":"tool_use","id":"t1","name":"Bash","input":{"command":"ls"}}]}}'
echo '{"type":"result","subtype":"success","result":"done"}'
"#;
        let mut stream = CliStream::spawn(shell(script), "sh").unwrap();

        let mut kinds = Vec::new();
        let mut last = None;
        while let Some(message) = stream.next_message().await {
            let message = message.unwrap();
            kinds.push(message.kind().to_string());
            last = Some(message);
        }

        assert_eq!(kinds, vec!["system:init", "assistant", "result"]);
        let Some(StreamMessage::Result { payload }) = last else {
            panic!("expected result last");
        };
        assert_eq!(payload.get("result"), Some(&json!("done")));

        stream.close().await.unwrap();
        stream.close().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_stream_error() {
        let script = r#"
echo '{"type":"system","subtype":"init"}'
echo 'boom' >&2
exit 3
"#;
        let mut stream = CliStream::spawn(shell(script), "sh").unwrap();

        let first = stream.next_message().await.unwrap().unwrap();
        assert_eq!(first.kind(), "system:init");

        let err = stream.next_message().await.unwrap().unwrap_err();
        match err.downcast_ref::<DelegationError>() {
            Some(DelegationError::ExpertExited { stderr, .. }) => assert!(stderr.contains("boom")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(stream.next_message().await.is_none());
        stream.close().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_close_stops_running_process() {
        let script = r#"
echo '{"type":"system","subtype":"init"}'
sleep 30
"#;
        let mut stream = CliStream::spawn(shell(script), "sh").unwrap();
        let first = stream.next_message().await.unwrap().unwrap();
        assert_eq!(first.kind(), "system:init");

        tokio::time::timeout(std::time::Duration::from_secs(5), stream.close())
            .await
            .expect("close should not hang")
            .unwrap();
        assert!(stream.next_message().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_background_stderr_holder_does_not_block_eof() {
        // The backgrounded sleep inherits stderr and keeps it open after sh exits
        let script = r#"
echo '{"type":"result","subtype":"success","result":"done"}'
sleep 8 >/dev/null &
exit 0
"#;
        let mut stream = CliStream::spawn(shell(script), "sh").unwrap();

        let first = stream.next_message().await.unwrap().unwrap();
        assert_eq!(first.kind(), "result");

        let end = tokio::time::timeout(std::time::Duration::from_secs(3), stream.next_message())
            .await
            .expect("end of stream should not wait for stderr holders");
        assert!(end.is_none());

        tokio::time::timeout(std::time::Duration::from_secs(3), stream.close())
            .await
            .expect("close should not hang")
            .unwrap();
    }
}
