//! Centralized path utilities
//!
//! All workspace-relative paths in one place for consistency

use std::path::{Path, PathBuf};

/// Default expert working directory (./sandbox)
pub fn default_working_dir() -> PathBuf {
    PathBuf::from("sandbox")
}

/// Default instruction set directory (./instructions)
pub fn default_instructions_dir() -> PathBuf {
    PathBuf::from("instructions")
}

/// Get the logs directory for a working directory (<working_dir>/logs)
pub fn logs_dir(working_dir: &Path) -> PathBuf {
    working_dir.join("logs")
}

/// Ensure the logs directory exists, creating it if necessary
pub fn ensure_logs_dir(working_dir: &Path) -> std::io::Result<PathBuf> {
    let dir = logs_dir(working_dir);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
