//! User-facing notices about what the expert is doing
//!
//! Notices are best-effort UX, separate from the detailed log.

use std::fmt;

use tokio::sync::mpsc;

/// A short notice naming the skill or tool the expert is using
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegationNotice {
    Skill { name: String },
    Tool { name: String },
}

impl fmt::Display for DelegationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegationNotice::Skill { name } => write!(f, "Using the skill: {}", name),
            DelegationNotice::Tool { name } => write!(f, "Using the tool: {}", name),
        }
    }
}

/// Destination for notices
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: DelegationNotice);
}

/// Prints notices to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutNotices;

impl NoticeSink for StdoutNotices {
    fn notify(&self, notice: DelegationNotice) {
        println!("{}", notice);
    }
}

impl NoticeSink for mpsc::UnboundedSender<DelegationNotice> {
    fn notify(&self, notice: DelegationNotice) {
        let _ = self.send(notice);
    }
}
