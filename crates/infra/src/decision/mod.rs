//! Decision engine: drives one submission from draft to audited decision.

pub mod fallback;
pub mod orchestrator;

use serde::Serialize;
use thiserror::Error;

use putaway_core::{AuditEntryId, DomainError};
use putaway_warehouse::Decision;

use crate::audit::AuditError;
use crate::config::ConfigError;

pub use fallback::{FallbackChoice, FallbackRule};
pub use orchestrator::{DecisionOrchestrator, DecisionStage, PendingDecision};

/// A finalized decision and the audit entry that holds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedDecision {
    pub entry_id: AuditEntryId,
    pub decision: Decision,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed submission or override request; nothing was recorded.
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("audit entry not found: {0}")]
    EntryNotFound(AuditEntryId),

    #[error(transparent)]
    Audit(AuditError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("decision cancelled before it was finalized")]
    Cancelled,

    #[error("decision task failed: {0}")]
    TaskFailed(String),
}

impl From<AuditError> for EngineError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::EntryNotFound(id) => EngineError::EntryNotFound(id),
            AuditError::InvalidOverride(msg) => EngineError::Validation(DomainError::validation(msg)),
            other => EngineError::Audit(other),
        }
    }
}
