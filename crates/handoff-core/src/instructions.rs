//! Instruction set loading
//!
//! Instruction sets are markdown files named `<name>.md` inside an
//! instructions directory. They are read once at startup; a missing set is
//! fatal.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::instructions::FILE_EXTENSION;
use crate::error::ConfigError;

/// Path of a named instruction set inside `dir`
pub fn instruction_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, FILE_EXTENSION))
}

/// Load a named instruction set from `dir`
pub fn load_instructions(dir: &Path, name: &str) -> Result<String, ConfigError> {
    // Names are bare identifiers, never paths
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(ConfigError::InvalidInstructionName(name.to_string()));
    }

    let path = instruction_path(dir, name);
    if !path.is_file() {
        return Err(ConfigError::InstructionsNotFound {
            name: name.to_string(),
            path,
        });
    }

    let content =
        fs::read_to_string(&path).map_err(|source| ConfigError::InstructionsUnreadable {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;

    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(ConfigError::InstructionsEmpty {
            name: name.to_string(),
            path,
        });
    }

    debug!("Loaded instruction set '{}' ({} chars)", name, content.len());
    Ok(content)
}
