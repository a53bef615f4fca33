//! Append-only audit trail of decisions and operator overrides.
//!
//! Storage sits behind [`AuditLog`]; [`AuditRecorder`] is the only way the
//! rest of the system writes to it.

pub mod in_memory;
pub mod jsonl;
pub mod r#trait;

use std::sync::Arc;

use tracing::info;

use putaway_core::{AuditEntryId, DecisionId, ZoneId};
use putaway_warehouse::Decision;

pub use in_memory::InMemoryAuditLog;
pub use jsonl::JsonlAuditLog;
pub use r#trait::{AuditEntry, AuditError, AuditLog, AuditRecord, OverrideRecord, UncommittedEntry};

/// Records decisions and overrides, and answers history queries.
///
/// Nothing here updates or deletes: an override is a new entry and the
/// effective zone is derived from the latest one.
#[derive(Clone)]
pub struct AuditRecorder {
    log: Arc<dyn AuditLog>,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

impl AuditRecorder {
    pub fn new(log: Arc<dyn AuditLog>) -> Self {
        Self { log }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryAuditLog::new()))
    }

    pub fn record(&self, decision: &Decision) -> Result<AuditEntryId, AuditError> {
        let entry = self.log.append(UncommittedEntry::decision(decision.clone()))?;
        info!(
            entry_id = %entry.entry_id,
            decision_id = %decision.id,
            item_id = %decision.item_id,
            sequence = entry.sequence_number,
            source = %decision.source,
            "decision recorded"
        );
        Ok(entry.entry_id)
    }

    /// Append an override of the decision behind `entry_id`.
    ///
    /// `entry_id` may point at the decision itself or at an earlier override
    /// of it. Overrides are always accepted; `violations` is stored as given.
    pub fn record_override(
        &self,
        entry_id: AuditEntryId,
        new_zone: ZoneId,
        operator: &str,
        reason: &str,
        violations: Vec<String>,
    ) -> Result<AuditEntry, AuditError> {
        let operator = operator.trim();
        if operator.is_empty() {
            return Err(AuditError::InvalidOverride("operator cannot be blank".to_string()));
        }

        let target = self.log.get(entry_id)?.ok_or(AuditError::EntryNotFound(entry_id))?;

        let record = OverrideRecord {
            target_entry: entry_id,
            previous_zone: None,
            new_zone,
            operator: operator.to_string(),
            reason: reason.trim().to_string(),
            violations,
        };
        let entry = self.log.append(UncommittedEntry::override_of(target.decision_id, record))?;

        info!(
            entry_id = %entry.entry_id,
            decision_id = %entry.decision_id,
            target_entry = %entry_id,
            sequence = entry.sequence_number,
            operator,
            "override recorded"
        );
        Ok(entry)
    }

    pub fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        self.log.entries()
    }

    pub fn get(&self, entry_id: AuditEntryId) -> Result<Option<AuditEntry>, AuditError> {
        self.log.get(entry_id)
    }

    /// The original decision plus all of its overrides, in sequence order.
    pub fn history(&self, decision_id: DecisionId) -> Result<Vec<AuditEntry>, AuditError> {
        Ok(self
            .log
            .entries()?
            .into_iter()
            .filter(|e| e.decision_id == decision_id)
            .collect())
    }

    pub fn decision(&self, decision_id: DecisionId) -> Result<Option<Decision>, AuditError> {
        Ok(self
            .history(decision_id)?
            .into_iter()
            .find_map(|e| match e.record {
                AuditRecord::Decision(d) => Some(d),
                AuditRecord::Override(_) => None,
            }))
    }

    /// Zone currently in force: the latest override's, else the decision's.
    pub fn effective_zone(&self, decision_id: DecisionId) -> Result<Option<ZoneId>, AuditError> {
        Ok(r#trait::effective_zone(&self.log.entries()?, decision_id))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;

    use putaway_core::{DecisionId, ItemId, ZoneId};
    use putaway_warehouse::{Decision, DecisionSource};

    pub fn sample_decision(zone: &str) -> Decision {
        Decision {
            id: DecisionId::new(),
            item_id: ItemId::new("ITEM-1").unwrap(),
            zone: Some(ZoneId::new(zone).unwrap()),
            confidence: 1.0,
            reasoning: "only zone allowed".to_string(),
            constraints: vec![],
            source: DecisionSource::Rule,
            warnings: vec![],
            rejected: vec![],
            decided_at: Utc::now(),
        }
    }
}
