use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::{info, warn};

use super::r#trait::{AuditEntry, AuditError, AuditLog, UncommittedEntry};

struct Inner {
    file: File,
    entries: Vec<AuditEntry>,
}

/// Audit log persisted as JSON lines, one committed entry per line.
///
/// Existing entries are reloaded on open; a torn trailing line left by an
/// interrupted write is dropped. A line is written and synced to disk before
/// the entry becomes visible to readers, and a failed write is rolled back.
///
/// Appends are small synchronous writes made under the log lock.
pub struct JsonlAuditLog {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for JsonlAuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlAuditLog").field("path", &self.path).finish()
    }
}

impl JsonlAuditLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() { load(&path)? } else { Vec::new() };
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        info!(path = %path.display(), entries = entries.len(), "audit log opened");
        Ok(Self {
            path,
            inner: Mutex::new(Inner { file, entries }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load(path: &Path) -> Result<Vec<AuditEntry>, AuditError> {
    let contents = std::fs::read(path)?;
    let mut entries: Vec<AuditEntry> = Vec::new();
    let mut offset = 0usize;

    for (idx, raw) in contents.split_inclusive(|b| *b == b'\n').enumerate() {
        let line_start = offset;
        offset += raw.len();
        let terminated = raw.ends_with(b"\n");

        let line = raw.trim_ascii();
        if line.is_empty() {
            continue;
        }
        let entry: AuditEntry = match serde_json::from_slice(line) {
            Ok(entry) => entry,
            // Only the unterminated last line can be the remains of a torn write.
            Err(e) if !terminated => {
                warn!(
                    path = %path.display(),
                    line = idx + 1,
                    bytes = raw.len(),
                    error = %e,
                    "discarding torn trailing audit line"
                );
                OpenOptions::new().write(true).open(path)?.set_len(line_start as u64)?;
                break;
            }
            Err(e) => {
                return Err(AuditError::Corrupt {
                    line: idx + 1,
                    message: e.to_string(),
                });
            }
        };

        let expected = entries.last().map(|e| e.sequence_number + 1).unwrap_or(1);
        if entry.sequence_number != expected {
            return Err(AuditError::Corrupt {
                line: idx + 1,
                message: format!("expected sequence {expected}, found {}", entry.sequence_number),
            });
        }
        entries.push(entry);

        if !terminated {
            // Complete entry whose newline never made it to disk.
            let mut file = OpenOptions::new().append(true).open(path)?;
            file.write_all(b"\n")?;
            file.sync_data()?;
        }
    }

    Ok(entries)
}

fn write_line(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line)?;
    file.sync_data()
}

impl AuditLog for JsonlAuditLog {
    fn append(&self, entry: UncommittedEntry) -> Result<AuditEntry, AuditError> {
        let mut inner = self.inner.lock().map_err(|_| AuditError::LockPoisoned)?;

        let committed = AuditEntry::commit(entry, &inner.entries, Utc::now());
        let mut line =
            serde_json::to_string(&committed).map_err(|e| AuditError::Serialization(e.to_string()))?;
        line.push('\n');

        let len_before = inner.file.metadata()?.len();
        if let Err(e) = write_line(&mut inner.file, line.as_bytes()) {
            if let Err(rollback) = inner.file.set_len(len_before) {
                warn!(path = %self.path.display(), error = %rollback, "failed to roll back partial audit write");
            }
            return Err(e.into());
        }
        inner.entries.push(committed.clone());
        Ok(committed)
    }

    fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let inner = self.inner.lock().map_err(|_| AuditError::LockPoisoned)?;
        Ok(inner.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::r#trait::AuditRecord;
    use crate::audit::test_support::sample_decision;

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let first = {
            let log = JsonlAuditLog::open(&path).unwrap();
            let a = log.append(UncommittedEntry::decision(sample_decision("A"))).unwrap();
            log.append(UncommittedEntry::decision(sample_decision("B"))).unwrap();
            a
        };

        let log = JsonlAuditLog::open(&path).unwrap();
        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], first);

        let third = log.append(UncommittedEntry::decision(sample_decision("C"))).unwrap();
        assert_eq!(third.sequence_number, 3);
        assert!(third.recorded_at >= entries[1].recorded_at);
        assert!(matches!(third.record, AuditRecord::Decision(_)));
    }

    #[test]
    fn nested_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("var").join("audit.jsonl");

        let log = JsonlAuditLog::open(&path).unwrap();
        log.append(UncommittedEntry::decision(sample_decision("A"))).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn corrupt_lines_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();

        let err = JsonlAuditLog::open(&path).unwrap_err();
        assert!(matches!(err, AuditError::Corrupt { line: 1, .. }));
    }

    #[test]
    fn torn_trailing_line_is_dropped_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        {
            let log = JsonlAuditLog::open(&path).unwrap();
            log.append(UncommittedEntry::decision(sample_decision("A"))).unwrap();
        }
        let intact_len = std::fs::metadata(&path).unwrap().len();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"entryId":"0190"#).unwrap();
        drop(file);

        let log = JsonlAuditLog::open(&path).unwrap();
        assert_eq!(log.entries().unwrap().len(), 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), intact_len);

        let next = log.append(UncommittedEntry::decision(sample_decision("B"))).unwrap();
        assert_eq!(next.sequence_number, 2);
        drop(log);

        let reopened = JsonlAuditLog::open(&path).unwrap();
        let sequences: Vec<u64> = reopened.entries().unwrap().iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequences, vec![1, 2]);
    }

    #[test]
    fn complete_entry_missing_its_newline_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        {
            let log = JsonlAuditLog::open(&path).unwrap();
            log.append(UncommittedEntry::decision(sample_decision("A"))).unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, contents.trim_end()).unwrap();

        let log = JsonlAuditLog::open(&path).unwrap();
        log.append(UncommittedEntry::decision(sample_decision("B"))).unwrap();
        drop(log);

        let reopened = JsonlAuditLog::open(&path).unwrap();
        assert_eq!(reopened.entries().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_line_before_the_tail_is_still_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        {
            let log = JsonlAuditLog::open(&path).unwrap();
            log.append(UncommittedEntry::decision(sample_decision("A"))).unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, format!("{{\"entryId\":\"0190\n{contents}")).unwrap();

        let err = JsonlAuditLog::open(&path).unwrap_err();
        assert!(matches!(err, AuditError::Corrupt { line: 1, .. }));
    }

    #[test]
    fn sequence_gaps_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        {
            let log = JsonlAuditLog::open(&path).unwrap();
            log.append(UncommittedEntry::decision(sample_decision("A"))).unwrap();
            log.append(UncommittedEntry::decision(sample_decision("B"))).unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let second_line = contents.lines().nth(1).unwrap().to_string();
        std::fs::write(&path, format!("{second_line}\n")).unwrap();

        let err = JsonlAuditLog::open(&path).unwrap_err();
        assert!(matches!(err, AuditError::Corrupt { line: 1, .. }));
    }
}
