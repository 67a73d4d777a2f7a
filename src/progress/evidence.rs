//! Lookup of generated documents for a scenario.

use std::fs;
use std::path::{Path, PathBuf};

/// Documents found on disk for a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionEvidence {
    /// First `<id>_*.md` in the docs directory
    pub doc_file: Option<PathBuf>,

    /// First `<id>_*.md` in the findings directory
    pub findings_file: Option<PathBuf>,
}

impl CompletionEvidence {
    /// Look for the scenario's documents.
    ///
    /// Only existence matters; file contents are never read.
    pub fn find(docs_dir: &Path, findings_dir: &Path, scenario_id: u64) -> Self {
        Self {
            doc_file: first_document(docs_dir, scenario_id),
            findings_file: first_document(findings_dir, scenario_id),
        }
    }

    /// Whether a scenario document exists.
    pub fn has_document(&self) -> bool {
        self.doc_file.is_some()
    }
}

/// All `<id>_*.md` files in `dir`, sorted by name.
pub(crate) fn scenario_documents(dir: &Path, scenario_id: u64) -> Vec<PathBuf> {
    let prefix = format!("{scenario_id}_");
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let is_markdown = path.extension().map_or(false, |ext| ext == "md");
            let matches_id = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |name| name.starts_with(&prefix));
            is_markdown && matches_id
        })
        .collect();

    found.sort();
    found
}

fn first_document(dir: &Path, scenario_id: u64) -> Option<PathBuf> {
    scenario_documents(dir, scenario_id).into_iter().next()
}
