//! Scenario manifest.
//!
//! The manifest is the external catalog of every exported scenario. It is
//! produced by the export step and only ever read here.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One scenario in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioManifestEntry {
    /// Scenario ID (unique)
    pub id: u64,

    /// Scenario name
    pub name: String,

    /// Folder/category the scenario belongs to
    pub category: String,

    /// Whether the scenario is switched on in the automation platform
    #[serde(default)]
    pub is_active: bool,

    /// Scenario kind as reported by the export
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    /// Flow-definition file, relative to the snapshot directory
    pub filename: String,
}

fn default_kind() -> String {
    "scenario".to_string()
}

impl ScenarioManifestEntry {
    /// Key used for this scenario in the progress ledger.
    pub fn ledger_key(&self) -> String {
        self.id.to_string()
    }

    /// Name truncated to `max_chars` characters for progress lines.
    pub fn short_name(&self, max_chars: usize) -> &str {
        match self.name.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.name[..idx],
            None => &self.name,
        }
    }
}

/// The scenario catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Number of scenarios reported by the export
    #[serde(default)]
    pub scenario_count: Option<usize>,

    /// All scenarios
    pub scenarios: Vec<ScenarioManifestEntry>,
}

impl Manifest {
    /// Build a manifest from entries.
    pub fn new(scenarios: Vec<ScenarioManifestEntry>) -> Self {
        Self { scenario_count: Some(scenarios.len()), scenarios }
    }

    /// Load the manifest from a file.
    ///
    /// A missing manifest is fatal: nothing can be prepared or reported
    /// without it, so the error names the variable that points at it.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Manifest not found: {}\nMake sure {} (or paths.snapshot_dir) points at the right snapshot.",
                path.display(),
                crate::core::ENV_SNAPSHOT
            );
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Parse a manifest from JSON text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let manifest: Self = serde_json::from_str(content)?;
        Ok(manifest)
    }

    /// Scenario count as reported by the export, or the number of entries.
    pub fn scenario_count(&self) -> usize {
        self.scenario_count.unwrap_or(self.scenarios.len())
    }

    /// Find a scenario by ID.
    pub fn get(&self, id: u64) -> Option<&ScenarioManifestEntry> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the manifest lists no scenarios.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
