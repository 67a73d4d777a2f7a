//! Progress reporting.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::manifest::Manifest;
use crate::progress::ProgressLedger;

/// Pending samples shown per category in verbose mode.
pub const SAMPLES_PER_CATEGORY: usize = 5;

/// Overall documentation progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub total: usize,
    /// Manifest scenarios present in the ledger
    pub done: usize,
    pub pending: usize,
    pub active_total: usize,
    pub active_done: usize,
    pub inactive_total: usize,
    pub inactive_done: usize,
    /// Ledger entries whose scenario is no longer in the manifest
    pub orphaned: usize,
    pub started_at: Option<NaiveDateTime>,
    pub last_updated: Option<NaiveDateTime>,
    /// Per-category breakdown, only in verbose mode
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryStatus>,
}

/// Progress of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatus {
    pub category: String,
    pub total: usize,
    pub done: usize,
    /// Up to [`SAMPLES_PER_CATEGORY`] pending scenarios, manifest order
    pub pending_samples: Vec<PendingSample>,
    /// Pending scenarios not listed in the samples
    pub more_pending: usize,
}

/// A pending scenario shown in the breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSample {
    pub id: u64,
    pub name: String,
    pub is_active: bool,
}

impl StatusReport {
    /// Compute the report from the ledger and manifest.
    pub fn build(ledger: &ProgressLedger, manifest: &Manifest, verbose: bool) -> Self {
        let scenarios = &manifest.scenarios;
        let total = scenarios.len();
        let done = scenarios.iter().filter(|s| ledger.is_complete(s.id)).count();
        let active_total = scenarios.iter().filter(|s| s.is_active).count();
        let active_done =
            scenarios.iter().filter(|s| s.is_active && ledger.is_complete(s.id)).count();
        let orphaned = ledger
            .completed
            .keys()
            .filter(|key| !scenarios.iter().any(|s| s.id.to_string() == **key))
            .count();

        let categories = if verbose { category_breakdown(ledger, manifest) } else { Vec::new() };

        Self {
            total,
            done,
            pending: total - done,
            active_total,
            active_done,
            inactive_total: total - active_total,
            inactive_done: done - active_done,
            orphaned,
            started_at: ledger.started_at,
            last_updated: ledger.last_updated,
            categories,
        }
    }

    /// Completion percentage, rounded down.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.done * 100 / self.total
        }
    }
}

fn category_breakdown(ledger: &ProgressLedger, manifest: &Manifest) -> Vec<CategoryStatus> {
    let mut by_category: BTreeMap<&str, CategoryStatus> = BTreeMap::new();

    for scenario in &manifest.scenarios {
        let status = by_category.entry(scenario.category.as_str()).or_insert_with(|| CategoryStatus {
            category: scenario.category.clone(),
            total: 0,
            done: 0,
            pending_samples: Vec::new(),
            more_pending: 0,
        });

        status.total += 1;
        if ledger.is_complete(scenario.id) {
            status.done += 1;
        } else if status.pending_samples.len() < SAMPLES_PER_CATEGORY {
            status.pending_samples.push(PendingSample {
                id: scenario.id,
                name: scenario.name.clone(),
                is_active: scenario.is_active,
            });
        } else {
            status.more_pending += 1;
        }
    }

    by_category.into_values().collect()
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Documentation Status")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "  Total scenarios:  {}", self.total)?;
        writeln!(f, "  Documented:       {}/{} ({}%)", self.done, self.total, self.percent())?;
        writeln!(f, "  Pending:          {}", self.pending)?;
        writeln!(f)?;
        writeln!(f, "  Active:           {}/{} documented", self.active_done, self.active_total)?;
        writeln!(f, "  Inactive:         {}/{} documented", self.inactive_done, self.inactive_total)?;

        if self.orphaned > 0 {
            writeln!(f, "  Not in manifest:  {} ledger entries", self.orphaned)?;
        }

        if let (Some(started), Some(updated)) = (self.started_at, self.last_updated) {
            writeln!(f)?;
            writeln!(f, "  Started:          {}", started.format("%Y-%m-%d %H:%M:%S"))?;
            writeln!(f, "  Last activity:    {}", updated.format("%Y-%m-%d %H:%M:%S"))?;
        }

        if !self.categories.is_empty() {
            writeln!(f)?;
            writeln!(f, "By category:")?;
            for category in &self.categories {
                writeln!(f)?;
                writeln!(f, "  [{}] {}/{}", category.category, category.done, category.total)?;
                for sample in &category.pending_samples {
                    let state = if sample.is_active { "ON " } else { "OFF" };
                    writeln!(f, "    {} [{}] {}", state, sample.id, sample.name)?;
                }
                if category.more_pending > 0 {
                    writeln!(f, "    ... and {} more", category.more_pending)?;
                }
            }
        }

        Ok(())
    }
}
