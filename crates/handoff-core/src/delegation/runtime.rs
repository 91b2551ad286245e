//! Expert runtime seam
//!
//! An `ExpertRuntime` turns a `DelegationRequest` into an open `ExpertStream`.
//! The stream is owned by exactly one delegation call and must be closed by it.

use anyhow::Result;
use async_trait::async_trait;

use super::message::StreamMessage;
use super::types::DelegationRequest;

/// Factory for expert message streams
#[async_trait]
pub trait ExpertRuntime: Send + Sync {
    /// Start the expert for `request` and return its message stream
    async fn open(&self, request: &DelegationRequest) -> Result<Box<dyn ExpertStream>>;
}

/// An open, ordered stream of messages from the expert
#[async_trait]
pub trait ExpertStream: Send {
    /// Next message in arrival order, `None` once the stream has ended
    async fn next_message(&mut self) -> Option<Result<StreamMessage>>;

    /// Release the stream. Idempotent; safe after the stream has ended or
    /// been abandoned mid-way.
    async fn close(&mut self) -> Result<()>;
}
