//! Error types for configuration and delegation

use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration failures. These are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("instruction set '{name}' not found at {}", .path.display())]
    InstructionsNotFound { name: String, path: PathBuf },

    #[error("failed to read instruction set '{name}' from {}: {source}", .path.display())]
    InstructionsUnreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("instruction set '{name}' at {} is empty", .path.display())]
    InstructionsEmpty { name: String, path: PathBuf },

    #[error("invalid instruction set name '{0}'")]
    InvalidInstructionName(String),
}

/// Failures raised by a delegation call
#[derive(Debug, Error)]
pub enum DelegationError {
    #[error("task prompt must not be empty")]
    EmptyTaskPrompt,

    #[error("expert persona must not be empty")]
    EmptyPersona,

    #[error("unsupported system prompt preset '{0}'")]
    UnsupportedPreset(String),

    #[error("failed to start expert runtime '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("expert runtime exited with {status}{}", format_stderr(.stderr))]
    ExpertExited { status: String, stderr: String },
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
