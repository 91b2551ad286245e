//! Routing agent definition
//!
//! The top-level agent that receives user requests and hands sub-tasks to
//! experts through `delegate_task`. Its reasoning loop lives in an external
//! agent framework; this is the definition that framework consumes.

use serde::Serialize;

use crate::config::RoutingConfig;
use crate::tools::{ToolDefinition, ToolRegistry};

pub const AGENT_NAME: &str = "MainAgent";
pub const AGENT_DESCRIPTION: &str =
    "The main agent that makes sure the user's machine learning requests are successfully fulfilled";
/// Session key the agent's final answer is stored under
pub const OUTPUT_KEY: &str = "final_output";

/// Model endpoint of the routing agent, with the key masked for display
#[derive(Debug, Clone, Serialize)]
pub struct RoutingModel {
    pub model: String,
    pub api_base: String,
    pub api_key: String,
}

/// Everything an agent framework needs to instantiate the routing agent
#[derive(Debug, Clone, Serialize)]
pub struct RoutingAgent {
    pub name: String,
    pub description: String,
    pub instruction: String,
    pub model: RoutingModel,
    pub tools: Vec<ToolDefinition>,
    pub output_key: String,
}

impl RoutingAgent {
    /// Build the definition. The API key is masked; use `RoutingConfig`
    /// directly when the real key is needed.
    pub fn new(config: &RoutingConfig, instruction: impl Into<String>, tools: &ToolRegistry) -> Self {
        Self {
            name: AGENT_NAME.to_string(),
            description: AGENT_DESCRIPTION.to_string(),
            instruction: instruction.into(),
            model: RoutingModel {
                model: config.routed_model(),
                api_base: config.api_base.clone(),
                api_key: config.masked_api_key(),
            },
            tools: tools.definitions(),
            output_key: OUTPUT_KEY.to_string(),
        }
    }
}
