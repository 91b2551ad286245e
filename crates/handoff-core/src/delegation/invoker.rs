//! Delegation invoker
//!
//! Builds the outbound request, opens the expert stream, drains it through a
//! `StreamAggregator` and closes it on every exit path.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, info_span, warn, Instrument};

use super::aggregator::StreamAggregator;
use super::notice::{NoticeSink, StdoutNotices};
use super::runtime::ExpertRuntime;
use super::types::{compose_prompt, DelegationRequest, DelegationResult};
use crate::config::ExpertSettings;
use crate::constants::logging::BANNER_WIDTH;
use crate::error::DelegationError;

/// Forwards tasks to the expert runtime and returns its terminal result
pub struct Delegator {
    runtime: Arc<dyn ExpertRuntime>,
    common_instructions: String,
    settings: ExpertSettings,
    notices: Arc<dyn NoticeSink>,
}

impl Delegator {
    /// `common_instructions` is prepended to every task prompt
    pub fn new(runtime: Arc<dyn ExpertRuntime>, common_instructions: impl Into<String>) -> Self {
        Self {
            runtime,
            common_instructions: common_instructions.into(),
            settings: ExpertSettings::default(),
            notices: Arc::new(StdoutNotices),
        }
    }

    pub fn with_settings(mut self, settings: ExpertSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }

    pub fn settings(&self) -> &ExpertSettings {
        &self.settings
    }

    /// Delegate a task to the expert described by `expert_persona`.
    ///
    /// Returns `Ok(None)` when the expert stream ended without a terminal
    /// result. Stream failures are returned after the stream has been closed.
    pub async fn delegate(
        &self,
        task_prompt: &str,
        expert_persona: &str,
    ) -> Result<Option<DelegationResult>> {
        if task_prompt.trim().is_empty() {
            return Err(DelegationError::EmptyTaskPrompt.into());
        }
        if expert_persona.trim().is_empty() {
            return Err(DelegationError::EmptyPersona.into());
        }

        let request = DelegationRequest::new(
            compose_prompt(&self.common_instructions, task_prompt),
            expert_persona,
            &self.settings,
        );
        let span = info_span!("delegation", id = %request.id);

        async move {
            log_request(&request);
            self.run(&request).await
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &DelegationRequest) -> Result<Option<DelegationResult>> {
        let mut stream = self.runtime.open(request).await?;
        info!("Starting expert query...");

        let mut aggregator = StreamAggregator::new(self.notices.as_ref());
        let drained = aggregator.drain(stream.as_mut()).await;

        // Runs whether or not the drain succeeded
        if let Err(e) = stream.close().await {
            warn!("Failed to close expert stream: {:#}", e);
        }
        info!(
            "Task delegation finished. Processed {} messages.",
            aggregator.message_count()
        );
        info!("{}", "=".repeat(BANNER_WIDTH));

        if let Err(e) = drained {
            error!("Expert stream failed: {:#}", e);
            return Err(e);
        }
        Ok(aggregator.into_result())
    }
}

fn log_request(request: &DelegationRequest) {
    let rule = "=".repeat(BANNER_WIDTH);
    let thin = "-".repeat(BANNER_WIDTH);

    info!("{}", rule);
    info!("DELEGATING TASK TO EXPERT");
    info!("{}", rule);

    info!("EXPERT SYSTEM PROMPT:");
    info!("{}", thin);
    info!("{}", request.expert_persona);
    info!("{}", thin);

    info!("FULL USER PROMPT SENT TO EXPERT:");
    info!("{}", thin);
    info!("{}", request.task_prompt);
    info!("{}", thin);

    info!("CONFIGURATION:");
    info!("   - Working Directory: {}", request.working_dir.display());
    info!("   - Permission Mode: {}", request.permission_mode);
    info!("   - Preset: {}", request.preset);
    info!("{}", rule);
}
