//! Expert delegation
//!
//! ## Invoker
//! - `Delegator` - Builds the request, owns the stream lifecycle (open, drain, close)
//!
//! ## Stream processing
//! - `StreamAggregator` - Classifies messages, logs them, keeps the latest result
//! - `StreamMessage` / `ContentBlock` - Closed message model of the expert stream
//!
//! ## Runtime seam
//! - `ExpertRuntime` / `ExpertStream` - Opens and drives an expert stream
//! - `ClaudeCliRuntime` - Runs the `claude` CLI with stream-json output

pub mod aggregator;
pub mod claude_cli;
pub mod invoker;
pub mod message;
pub mod notice;
pub mod preview;
pub mod runtime;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::StreamAggregator;
pub use claude_cli::ClaudeCliRuntime;
pub use invoker::Delegator;
pub use message::{ContentBlock, StreamMessage};
pub use notice::{DelegationNotice, NoticeSink, StdoutNotices};
pub use runtime::{ExpertRuntime, ExpertStream};
pub use types::{DelegationRequest, DelegationResult, PermissionMode};
