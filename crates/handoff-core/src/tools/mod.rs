//! Tools exposed to the routing agent
//!
//! The routing agent has a single tool, `delegate_task`, which forwards a
//! sub-task to the expert runtime.

pub mod delegate;
pub mod registry;

pub use delegate::DelegateTaskTool;
pub use registry::{parse_params, Tool, ToolDefinition, ToolRegistry, ToolResult};
