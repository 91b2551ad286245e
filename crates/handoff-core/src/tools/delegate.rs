//! Delegate tool - Forward a task to the expert runtime

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::delegation::Delegator;
use crate::error::DelegationError;
use crate::tools::registry::{parse_params, Tool, ToolResult};

pub struct DelegateTaskTool {
    delegator: Arc<Delegator>,
}

impl DelegateTaskTool {
    pub fn new(delegator: Arc<Delegator>) -> Self {
        Self { delegator }
    }
}

#[derive(Deserialize)]
struct Params {
    /// The prompt describing the task to delegate
    prompt: String,
    /// The system prompt describing the expert
    append_system_prompt: String,
}

#[async_trait]
impl Tool for DelegateTaskTool {
    fn name(&self) -> &str {
        "delegate_task"
    }

    fn description(&self) -> &str {
        "Delegate a task to an expert. Provide the task prompt and a system prompt describing the expert. Returns the expert's final result, or null if the expert finished without one."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "The prompt describing the task to delegate"
                },
                "append_system_prompt": {
                    "type": "string",
                    "description": "The system prompt describing the expert"
                }
            },
            "required": ["prompt", "append_system_prompt"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, params: Value) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        match self
            .delegator
            .delegate(&params.prompt, &params.append_system_prompt)
            .await
        {
            Ok(Some(result)) => ToolResult::success_data(Value::Object(result)),
            Ok(None) => ToolResult::success_data(Value::Null),
            Err(e) => match e.downcast_ref::<DelegationError>() {
                Some(DelegationError::EmptyTaskPrompt | DelegationError::EmptyPersona) => {
                    ToolResult::invalid_parameters(e)
                }
                _ => ToolResult::error(format!("Delegation failed: {:#}", e)),
            },
        }
    }
}
