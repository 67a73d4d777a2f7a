//! Markdown indexes of the generated documentation.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::core::{write_file_atomic, Config};
use crate::manifest::{Manifest, ScenarioManifestEntry};
use crate::progress::{scenario_documents, ProgressLedger};

/// Name of the generated index files.
pub const INDEX_FILE: &str = "index.md";

/// Suffix of findings documents listed in the findings index.
pub const FINDINGS_SUFFIX: &str = "_findings.md";

/// Paths written by [`write_indexes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    pub docs_index: PathBuf,
    /// Only written when findings exist
    pub findings_index: Option<PathBuf>,
}

/// Regenerate the scenario index and, when findings exist, the findings index.
pub fn write_indexes(
    config: &Config,
    ledger: &ProgressLedger,
    manifest: &Manifest,
    now: NaiveDateTime,
) -> anyhow::Result<IndexPaths> {
    let docs_dir = &config.paths.docs_dir;
    let findings_dir = &config.paths.findings_dir;

    let docs_index = docs_dir.join(INDEX_FILE);
    let content = render_docs_index(ledger, manifest, docs_dir, &config.paths.snapshot_dir, now);
    write_file_atomic(&docs_index, &content)?;
    tracing::info!(path = %docs_index.display(), "Scenario index written");

    let findings = findings_documents(findings_dir);
    let findings_index = if findings.is_empty() {
        None
    } else {
        let path = findings_dir.join(INDEX_FILE);
        write_file_atomic(&path, &render_findings_index(&findings, now))?;
        tracing::info!(path = %path.display(), files = findings.len(), "Findings index written");
        Some(path)
    };

    Ok(IndexPaths { docs_index, findings_index })
}

/// Per-category table of every scenario with its documentation state.
pub fn render_docs_index(
    ledger: &ProgressLedger,
    manifest: &Manifest,
    docs_dir: &Path,
    snapshot: &Path,
    now: NaiveDateTime,
) -> String {
    let mut out = String::new();
    let documented = manifest.scenarios.iter().filter(|s| ledger.is_complete(s.id)).count();

    out.push_str("# Scenario Documentation Index\n\n");
    let _ = writeln!(out, "**Generated:** {}\n", now.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "**Snapshot:** {}\n", snapshot.display());
    let _ = writeln!(
        out,
        "**Total:** {} scenarios | **Documented:** {}",
        manifest.len(),
        documented
    );

    let mut by_category: BTreeMap<&str, Vec<&ScenarioManifestEntry>> = BTreeMap::new();
    for scenario in &manifest.scenarios {
        by_category.entry(scenario.category.as_str()).or_default().push(scenario);
    }

    for (category, scenarios) in by_category {
        let _ = writeln!(out, "\n## {category}\n");
        out.push_str("| Status | ID | Name | Active | Doc |\n");
        out.push_str("|--------|----|------|--------|-----|\n");

        for scenario in scenarios {
            let done = ledger.is_complete(scenario.id);
            let status = if done { "✅" } else { "⬜" };
            let active = if scenario.is_active { "🟢" } else { "⚪" };
            let link = if done { doc_link(docs_dir, scenario.id) } else { String::new() };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                status,
                scenario.id,
                escape_cell(&scenario.name),
                active,
                link
            );
        }
    }

    out
}

/// Bullet list linking every findings document.
pub fn render_findings_index(files: &[PathBuf], now: NaiveDateTime) -> String {
    let mut out = String::new();
    out.push_str("# Findings Index\n\n");
    let _ = writeln!(out, "**Generated:** {}\n", now.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "**Total files:** {}\n", files.len());

    for file in files {
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let stem = file.file_stem().and_then(|n| n.to_str()).unwrap_or_default();
        let _ = writeln!(out, "- [{stem}]({name})");
    }

    out
}

fn doc_link(docs_dir: &Path, scenario_id: u64) -> String {
    scenario_documents(docs_dir, scenario_id)
        .first()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(|name| format!("[View]({name})"))
        .unwrap_or_default()
}

fn findings_documents(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name().and_then(|n| n.to_str()).map_or(false, |n| n.ends_with(FINDINGS_SUFFIX))
        })
        .collect();
    files.sort();
    files
}

/// Keep scenario names from breaking the table layout.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
