//! Persistent lint history with bounded retention.
//!
//! Stores `(source, diagnostics)` snapshots keyed by arrival time in a
//! JSON file, keeping only the most recent entries. A SHA-256 fingerprint
//! of the findings skips recording when nothing changed since the last
//! snapshot. The engine itself never touches this store; the builder and
//! CLI wire it in.

use crate::diagnostic::Diagnostic;
use crate::error::{ScriptlintError, ScriptlintResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Default retention bound: most-recent entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// History file format version. Increment when the format changes.
const HISTORY_VERSION: u32 = 1;

/// One recorded lint snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct HistoryFile {
    version: u32,
    next_id: u64,
    entries: Vec<HistoryEntry>,
}

/// Bounded, file-backed history of lint results.
#[derive(Debug)]
pub struct LintHistory {
    path: PathBuf,
    limit: usize,
    next_id: u64,
    entries: Vec<HistoryEntry>,
    last_fingerprint: Option<String>,
}

impl LintHistory {
    /// Open (or start fresh at) `path` with the given retention limit.
    /// A missing file yields an empty history; a file from an
    /// incompatible version is discarded.
    pub fn load(path: impl Into<PathBuf>, limit: usize) -> ScriptlintResult<Self> {
        let path = path.into();
        let file = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<HistoryFile>(&content)
                .map_err(|e| ScriptlintError::history(format!("corrupt history file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HistoryFile::default(),
            Err(e) => return Err(ScriptlintError::io(path, e)),
        };

        let file = if file.version == HISTORY_VERSION || file.entries.is_empty() {
            file
        } else {
            tracing::warn!(
                found = file.version,
                expected = HISTORY_VERSION,
                "discarding history from incompatible version"
            );
            HistoryFile::default()
        };

        let last_fingerprint = file.entries.last().map(|e| fingerprint(&e.diagnostics));
        Ok(Self {
            path,
            limit: limit.max(1),
            next_id: file.next_id,
            entries: file.entries,
            last_fingerprint,
        })
    }

    /// Record a snapshot unless the findings are identical to the latest
    /// entry. Returns whether anything was written.
    pub fn record(
        &mut self,
        source: &str,
        diagnostics: &[Diagnostic],
    ) -> ScriptlintResult<bool> {
        let fp = fingerprint(diagnostics);
        if self.last_fingerprint.as_deref() == Some(fp.as_str()) {
            return Ok(false);
        }

        self.next_id += 1;
        self.entries.push(HistoryEntry {
            id: self.next_id,
            source: source.to_string(),
            diagnostics: diagnostics.to_vec(),
            timestamp: Utc::now(),
        });
        while self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.last_fingerprint = Some(fp);
        self.save()?;
        Ok(true)
    }

    /// Delete the entry with `id`. Returns whether it existed.
    pub fn delete(&mut self, id: u64) -> ScriptlintResult<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.last_fingerprint = self.entries.last().map(|e| fingerprint(&e.diagnostics));
            self.save()?;
        }
        Ok(removed)
    }

    /// Entries in arrival order, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn save(&self) -> ScriptlintResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ScriptlintError::io(parent, e))?;
            }
        }
        let file = HistoryFile {
            version: HISTORY_VERSION,
            next_id: self.next_id,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| ScriptlintError::history(format!("serialize history: {e}")))?;
        fs::write(&self.path, json).map_err(|e| ScriptlintError::io(self.path.clone(), e))
    }
}

/// SHA-256 over the serialized findings; used for change detection only.
fn fingerprint(diagnostics: &[Diagnostic]) -> String {
    let mut sha = Sha256::new();
    for d in diagnostics {
        sha.update(d.message.as_bytes());
        sha.update([0]);
        sha.update(d.start.to_le_bytes());
        sha.update(d.end.to_le_bytes());
    }
    format!("{:x}", sha.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_history_path(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join("scriptlint_history_test")
            .join(format!("{name}_{id}.json"))
    }

    fn warn(message: &str, start: usize) -> Diagnostic {
        Diagnostic::warning(message, "", start, start + 1)
    }

    #[test]
    fn test_record_and_reload() {
        let path = temp_history_path("roundtrip");
        let mut history = LintHistory::load(&path, 10).unwrap();
        assert!(history.record("let x = 1", &[warn("Missing semicolon", 8)]).unwrap());

        let reloaded = LintHistory::load(&path, 10).unwrap();
        assert_eq!(reloaded.entries().len(), 1);
        assert_eq!(reloaded.entries()[0].source, "let x = 1");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unchanged_findings_not_rerecorded() {
        let path = temp_history_path("unchanged");
        let mut history = LintHistory::load(&path, 10).unwrap();
        let findings = vec![warn("Missing semicolon", 8)];
        assert!(history.record("let x = 1", &findings).unwrap());
        // Same findings, different source text: still skipped, matching
        // the change detection on findings only.
        assert!(!history.record("let x = 1 ", &findings).unwrap());
        assert_eq!(history.entries().len(), 1);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_change_detection_survives_reload() {
        let path = temp_history_path("reload_fp");
        let findings = vec![warn("Missing semicolon", 8)];
        {
            let mut history = LintHistory::load(&path, 10).unwrap();
            history.record("a", &findings).unwrap();
        }
        let mut history = LintHistory::load(&path, 10).unwrap();
        assert!(!history.record("a", &findings).unwrap());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_retention_bound_evicts_oldest() {
        let path = temp_history_path("bound");
        let mut history = LintHistory::load(&path, 3).unwrap();
        for i in 0..5 {
            let recorded = history.record("src", &[warn("finding", i)]).unwrap();
            assert!(recorded);
        }
        assert_eq!(history.entries().len(), 3);
        // Oldest evicted: the surviving entries are the last three.
        assert_eq!(history.entries()[0].diagnostics[0].start, 2);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_delete_entry() {
        let path = temp_history_path("delete");
        let mut history = LintHistory::load(&path, 10).unwrap();
        history.record("a", &[warn("one", 1)]).unwrap();
        history.record("b", &[warn("two", 2)]).unwrap();
        let id = history.entries()[0].id;

        assert!(history.delete(id).unwrap());
        assert!(!history.delete(id).unwrap());
        assert_eq!(history.entries().len(), 1);

        fs::remove_file(&path).ok();
    }
}
