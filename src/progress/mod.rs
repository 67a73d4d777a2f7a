//! Documentation progress ledger.
//!
//! The ledger records which scenarios have been documented. It is an explicit
//! value: load it, change it with the pure methods on [`ProgressLedger`],
//! and hand it back to [`ProgressStore::save`]. Presence of a scenario key in
//! `completed` means "documented"; the ledger never shrinks.

mod evidence;

pub use evidence::CompletionEvidence;
pub(crate) use evidence::scenario_documents;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::write_json_atomic;

/// Completion record for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// When the scenario was marked complete
    pub completed_at: NaiveDateTime,

    /// First scenario document found at completion time
    pub doc_file: Option<PathBuf>,

    /// First findings document found at completion time
    pub findings_file: Option<PathBuf>,
}

/// Persisted completion state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressLedger {
    /// Completed scenarios keyed by scenario ID
    #[serde(default)]
    pub completed: BTreeMap<String, ProgressRecord>,

    /// Error notes keyed by scenario ID, kept as found
    #[serde(default)]
    pub errors: BTreeMap<String, Value>,

    /// Set by the first save
    #[serde(default)]
    pub started_at: Option<NaiveDateTime>,

    /// Set by every save
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,

    /// Top-level keys written by other tools, carried through saves
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressLedger {
    /// Whether the scenario has been documented.
    pub fn is_complete(&self, scenario_id: u64) -> bool {
        self.completed.contains_key(&scenario_id.to_string())
    }

    /// Completion record of a scenario.
    pub fn record(&self, scenario_id: u64) -> Option<&ProgressRecord> {
        self.completed.get(&scenario_id.to_string())
    }

    /// Number of completed scenarios, including any no longer in the manifest.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Record a scenario as documented, replacing any earlier record.
    pub fn mark_complete(&mut self, scenario_id: u64, evidence: CompletionEvidence, now: NaiveDateTime) {
        let record = ProgressRecord {
            completed_at: now,
            doc_file: evidence.doc_file,
            findings_file: evidence.findings_file,
        };
        self.completed.insert(scenario_id.to_string(), record);
    }

    /// Update the save timestamps.
    ///
    /// `started_at` is only set when it was never set before.
    pub fn stamp(&mut self, now: NaiveDateTime) {
        self.last_updated = Some(now);
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }
}

/// File-backed ledger persistence.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Create a store for the given ledger file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger, or a fresh empty one when the file does not exist.
    pub fn load(&self) -> anyhow::Result<ProgressLedger> {
        if !self.path.exists() {
            return Ok(ProgressLedger::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read progress file {}", self.path.display()))?;
        let ledger = serde_json::from_str(&content)
            .with_context(|| format!("Invalid progress file {}", self.path.display()))?;
        Ok(ledger)
    }

    /// Stamp and persist the ledger, returning the stamped value.
    ///
    /// The file is replaced atomically; on failure the previous ledger
    /// stays on disk untouched.
    pub fn save(&self, ledger: ProgressLedger) -> anyhow::Result<ProgressLedger> {
        self.save_at(ledger, Local::now().naive_local())
    }

    /// [`save`](Self::save) with an explicit clock.
    pub fn save_at(&self, mut ledger: ProgressLedger, now: NaiveDateTime) -> anyhow::Result<ProgressLedger> {
        ledger.stamp(now);
        write_json_atomic(&self.path, &ledger)?;
        tracing::info!(
            path = %self.path.display(),
            completed = ledger.completed.len(),
            "Progress saved"
        );
        Ok(ledger)
    }
}
