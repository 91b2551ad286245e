//! Shared constants

/// Expert runtime defaults
pub mod expert {
    use std::time::Duration;

    /// Tool name the expert uses when it activates a skill
    pub const SKILL_TOOL_NAME: &str = "Skill";
    /// Key inside the skill tool input that names the skill
    pub const SKILL_INPUT_KEY: &str = "skill";
    /// Skill name used when the input does not carry one
    pub const UNKNOWN_SKILL: &str = "unknown";
    /// The only system prompt preset the CLI runtime understands
    pub const PRESET_CLAUDE_CODE: &str = "claude_code";
    /// Default expert executable, override with `HANDOFF_EXPERT_CLI`
    pub const DEFAULT_PROGRAM: &str = "claude";
    /// Number of stderr lines kept for error reporting
    pub const STDERR_TAIL_LINES: usize = 20;
    /// How long to wait for trailing stderr after the expert has exited.
    /// Background processes that inherited the pipe can hold it open.
    pub const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_millis(300);
}

/// Log formatting limits
pub mod logging {
    /// Max characters of tool input or text shown in a debug preview
    pub const PREVIEW_LIMIT: usize = 200;
    /// Marker appended to truncated previews
    pub const TRUNCATION_MARKER: &str = "...";
    /// Console timestamp format
    pub const CONSOLE_TIME_FORMAT: &str = "%H:%M:%S";
    /// Timestamp embedded in each run's log file name
    pub const FILE_NAME_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";
    /// Width of the banner separators
    pub const BANNER_WIDTH: usize = 80;
}

/// Environment variable names and their fallbacks
pub mod env {
    pub const ROUTING_URL: &str = "NEXUS_URL";
    pub const ROUTING_API_KEY: &str = "LITELLM_PROXY_API_KEY";
    pub const AGENT_MODEL: &str = "AGENT_MODEL";
    pub const EXPERT_CLI: &str = "HANDOFF_EXPERT_CLI";
    pub const INSTRUCTIONS_DIR: &str = "HANDOFF_INSTRUCTIONS_DIR";
    pub const WORKING_DIR: &str = "HANDOFF_WORKING_DIR";

    /// Placeholder endpoint, not a real deployment
    pub const DEFAULT_ROUTING_URL: &str = "https://routing.example.invalid";
    /// Placeholder key, never a real secret
    pub const DEFAULT_ROUTING_API_KEY: &str = "sk-placeholder";
    pub const DEFAULT_AGENT_MODEL: &str = "openai/gpt-4.1";
    /// Prefix that routes the model through the LiteLLM proxy
    pub const ROUTED_MODEL_PREFIX: &str = "litellm_proxy/";
}

/// Instruction set names
pub mod instructions {
    pub const COMMON: &str = "common_instructions";
    pub const MAIN_AGENT: &str = "main_agent";
    pub const FILE_EXTENSION: &str = "md";
}
