//! Infrastructure layer: configuration, audit storage, and the decision engine
//! that wires the warehouse rules to the reasoning service.

pub mod audit;
pub mod config;
pub mod decision;

pub use audit::{AuditEntry, AuditError, AuditLog, AuditRecord, AuditRecorder, InMemoryAuditLog, JsonlAuditLog};
pub use config::{ConfigError, EngineConfig, ReasoningConfig};
pub use decision::{DecisionOrchestrator, DecisionStage, EngineError, PendingDecision, RecordedDecision};
