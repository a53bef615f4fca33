use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use putaway_core::{AuditEntryId, DecisionId, ZoneId};
use putaway_warehouse::Decision;
use std::sync::Arc;

/// Operator override of a finalized decision.
///
/// The original decision is never touched; the override is a new entry that
/// points back at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    /// Entry the operator acted on.
    pub target_entry: AuditEntryId,
    /// Effective zone before this override; resolved when the entry is committed.
    pub previous_zone: Option<ZoneId>,
    pub new_zone: ZoneId,
    pub operator: String,
    pub reason: String,
    /// Mandatory constraints the new zone breaks (recorded, not enforced).
    #[serde(default)]
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    Decision(Decision),
    Override(OverrideRecord),
}

/// A record ready to be appended (not yet assigned a sequence number).
#[derive(Debug, Clone, PartialEq)]
pub struct UncommittedEntry {
    pub decision_id: DecisionId,
    pub record: AuditRecord,
}

impl UncommittedEntry {
    pub fn decision(decision: Decision) -> Self {
        Self {
            decision_id: decision.id,
            record: AuditRecord::Decision(decision),
        }
    }

    pub fn override_of(decision_id: DecisionId, record: OverrideRecord) -> Self {
        Self {
            decision_id,
            record: AuditRecord::Override(record),
        }
    }
}

/// A committed audit entry.
///
/// Sequence numbers start at 1 and have no gaps; `recorded_at` never goes
/// backwards along the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub entry_id: AuditEntryId,
    pub sequence_number: u64,
    pub recorded_at: DateTime<Utc>,
    pub decision_id: DecisionId,
    pub record: AuditRecord,
}

impl AuditEntry {
    pub fn as_decision(&self) -> Option<&Decision> {
        match &self.record {
            AuditRecord::Decision(d) => Some(d),
            AuditRecord::Override(_) => None,
        }
    }

    pub fn as_override(&self) -> Option<&OverrideRecord> {
        match &self.record {
            AuditRecord::Override(o) => Some(o),
            AuditRecord::Decision(_) => None,
        }
    }

    /// Assign the next sequence number and a timestamp not earlier than the
    /// last prior entry's. An override's `previous_zone` is taken from `prior`
    /// here, under the same lock that orders the append.
    pub(crate) fn commit(mut pending: UncommittedEntry, prior: &[AuditEntry], now: DateTime<Utc>) -> Self {
        if let AuditRecord::Override(record) = &mut pending.record {
            record.previous_zone = effective_zone(prior, pending.decision_id);
        }
        let (sequence_number, recorded_at) = match prior.last() {
            Some(prev) => (prev.sequence_number + 1, now.max(prev.recorded_at)),
            None => (1, now),
        };
        Self {
            entry_id: AuditEntryId::new(),
            sequence_number,
            recorded_at,
            decision_id: pending.decision_id,
            record: pending.record,
        }
    }
}

/// Zone in force for `decision_id`: the latest override's, else the decision's.
pub(crate) fn effective_zone(entries: &[AuditEntry], decision_id: DecisionId) -> Option<ZoneId> {
    let history = entries.iter().filter(|e| e.decision_id == decision_id);
    let decided = history.clone().find_map(|e| e.as_decision()?.zone.clone());
    history
        .rev()
        .find_map(|e| e.as_override().map(|o| o.new_zone.clone()))
        .or(decided)
}

/// Audit storage error.
///
/// These are **infrastructure errors**; an unknown entry on override is the
/// only one a caller is expected to handle.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit entry not found: {0}")]
    EntryNotFound(AuditEntryId),

    #[error("invalid override: {0}")]
    InvalidOverride(String),

    #[error("audit log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit entry serialization failed: {0}")]
    Serialization(String),

    #[error("audit log corrupt at line {line}: {message}")]
    Corrupt { line: usize, message: String },

    #[error("audit log lock poisoned")]
    LockPoisoned,
}

/// Append-only decision log.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - serialize appends (one writer at a time)
/// - assign sequence numbers `last + 1` with no gaps
/// - clamp `recorded_at` so it never precedes the previous entry
/// - never modify or drop a committed entry
pub trait AuditLog: Send + Sync {
    fn append(&self, entry: UncommittedEntry) -> Result<AuditEntry, AuditError>;

    /// All entries in sequence order.
    fn entries(&self) -> Result<Vec<AuditEntry>, AuditError>;

    fn get(&self, entry_id: AuditEntryId) -> Result<Option<AuditEntry>, AuditError> {
        Ok(self.entries()?.into_iter().find(|e| e.entry_id == entry_id))
    }
}

impl<S> AuditLog for Arc<S>
where
    S: AuditLog + ?Sized,
{
    fn append(&self, entry: UncommittedEntry) -> Result<AuditEntry, AuditError> {
        (**self).append(entry)
    }

    fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        (**self).entries()
    }

    fn get(&self, entry_id: AuditEntryId) -> Result<Option<AuditEntry>, AuditError> {
        (**self).get(entry_id)
    }
}
