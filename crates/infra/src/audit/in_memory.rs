use std::sync::RwLock;

use chrono::Utc;

use putaway_core::AuditEntryId;

use super::r#trait::{AuditEntry, AuditError, AuditLog, UncommittedEntry};

/// In-memory append-only audit log.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, entry: UncommittedEntry) -> Result<AuditEntry, AuditError> {
        let mut entries = self.entries.write().map_err(|_| AuditError::LockPoisoned)?;

        let committed = AuditEntry::commit(entry, &entries, Utc::now());
        entries.push(committed.clone());
        Ok(committed)
    }

    fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let entries = self.entries.read().map_err(|_| AuditError::LockPoisoned)?;
        Ok(entries.clone())
    }

    fn get(&self, entry_id: AuditEntryId) -> Result<Option<AuditEntry>, AuditError> {
        let entries = self.entries.read().map_err(|_| AuditError::LockPoisoned)?;
        Ok(entries.iter().find(|e| e.entry_id == entry_id).cloned())
    }
}
