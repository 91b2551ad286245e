//! Handoff core library
//!
//! Delegates sub-tasks from a routing agent to an expert agent runtime and
//! aggregates the expert's streamed output into a single structured result.
//!
//! - `delegation` - Invoker, stream aggregator, message model, runtime seam
//! - `config` - Routing and expert settings sourced from the environment
//! - `instructions` - Instruction-set loading at startup
//! - `routing` - Routing agent definition consumed by the top-level agent
//! - `tools` - The `delegate_task` tool exposed to the routing agent

pub mod config;
pub mod constants;
pub mod delegation;
pub mod error;
pub mod instructions;
pub mod paths;
pub mod routing;
pub mod tools;

pub use config::{ExpertSettings, RoutingConfig};
pub use delegation::{DelegationResult, Delegator};
pub use error::{ConfigError, DelegationError};
