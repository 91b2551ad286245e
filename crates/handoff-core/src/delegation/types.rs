//! Delegation request and result types

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::ExpertSettings;

/// Flattened fields of the expert's terminal result message
pub type DelegationResult = Map<String, Value>;

/// Tool permission policy handed to the expert runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// The runtime asks before running tools
    Restricted,
    /// All tool permission prompts are bypassed
    #[default]
    Unrestricted,
}

impl PermissionMode {
    /// Value understood by the expert runtime's `--permission-mode` flag
    pub fn as_runtime_str(&self) -> &'static str {
        match self {
            PermissionMode::Restricted => "default",
            PermissionMode::Unrestricted => "bypassPermissions",
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_runtime_str())
    }
}

/// A single outbound delegation. Built fresh per call and never mutated.
#[derive(Debug, Clone)]
pub struct DelegationRequest {
    /// Correlates log lines of one delegation
    pub id: Uuid,
    /// Full prompt: common instructions followed by the user prompt
    pub task_prompt: String,
    /// Expert persona appended to the preset system prompt
    pub expert_persona: String,
    pub working_dir: PathBuf,
    pub permission_mode: PermissionMode,
    pub preset: String,
    pub setting_sources: Vec<String>,
}

impl DelegationRequest {
    pub fn new(
        task_prompt: impl Into<String>,
        expert_persona: impl Into<String>,
        settings: &ExpertSettings,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_prompt: task_prompt.into(),
            expert_persona: expert_persona.into(),
            working_dir: settings.working_dir.clone(),
            permission_mode: settings.permission_mode,
            preset: settings.preset.clone(),
            setting_sources: settings.setting_sources.clone(),
        }
    }
}

/// Merge the shared instructions ahead of the user's task prompt
pub fn compose_prompt(common_instructions: &str, task_prompt: &str) -> String {
    format!("{}\n\nUser Prompt: {}", common_instructions, task_prompt)
}
