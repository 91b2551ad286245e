//! Runtime configuration
//!
//! Routing settings for the top-level agent and fixed operational policy for
//! expert delegation. Values come from the environment with placeholder
//! fallbacks; nothing here is a production secret.

use std::path::PathBuf;

use crate::constants::{env, expert};
use crate::delegation::PermissionMode;
use crate::paths;

/// Configuration for the routing (top-level) agent's model endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    /// API base URL of the routing proxy
    pub api_base: String,
    /// API key sent to the routing proxy
    pub api_key: String,
    /// Model identifier without the proxy prefix (e.g. "openai/gpt-4.1")
    pub model: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_base: env::DEFAULT_ROUTING_URL.to_string(),
            api_key: env::DEFAULT_ROUTING_API_KEY.to_string(),
            model: env::DEFAULT_AGENT_MODEL.to_string(),
        }
    }
}

impl RoutingConfig {
    /// Build from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, fallback: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            api_base: get(env::ROUTING_URL, env::DEFAULT_ROUTING_URL),
            api_key: get(env::ROUTING_API_KEY, env::DEFAULT_ROUTING_API_KEY),
            model: get(env::AGENT_MODEL, env::DEFAULT_AGENT_MODEL),
        }
    }

    /// Model id as sent through the LiteLLM proxy
    pub fn routed_model(&self) -> String {
        format!("{}{}", env::ROUTED_MODEL_PREFIX, self.model)
    }

    /// API key with the middle masked, safe for logs
    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

/// Mask a secret as `first8...last4`, or fully for short values
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 12 {
        return "*".repeat(count);
    }
    let head: String = secret.chars().take(8).collect();
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}...{}", head, tail)
}

/// Fixed operational policy applied to every delegation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertSettings {
    /// Directory the expert runs in
    pub working_dir: PathBuf,
    /// Tool permission policy for the expert
    pub permission_mode: PermissionMode,
    /// Named system prompt preset the persona is appended to
    pub preset: String,
    /// Settings sources the expert runtime loads
    pub setting_sources: Vec<String>,
}

impl Default for ExpertSettings {
    fn default() -> Self {
        Self {
            working_dir: paths::default_working_dir(),
            permission_mode: PermissionMode::Unrestricted,
            preset: expert::PRESET_CLAUDE_CODE.to_string(),
            setting_sources: vec!["user".to_string(), "project".to_string()],
        }
    }
}

impl ExpertSettings {
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = mode;
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }
}
