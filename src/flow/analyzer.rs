//! Flow analysis.
//!
//! Module counting walks the typed tree. Table and subscenario detection are
//! text heuristics over the serialized blueprint: they give the documentation
//! writer hints, not a reference graph. A table named `log` will match a
//! blueprint mentioning `login`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::blueprint::FlowNode;
use crate::schema::SchemaIndex;

/// Module type fragment marking a call into another scenario.
pub const CALL_SCENARIO_MARKER: &str = "CallScenario";

static SCENARIO_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""scenario":\s*"?(\d+)"?"#).expect("scenario reference pattern is valid")
});

/// Count modules in a flow, including every module on nested routes.
pub fn count_modules(flow: &[FlowNode]) -> usize {
    flow.iter()
        .map(|node| 1 + node.routes.iter().map(|route| count_modules(&route.flow)).sum::<usize>())
        .sum()
}

/// Detect schema tables mentioned anywhere in the blueprint.
///
/// Case-insensitive substring match of every table name against the
/// serialized document. Without a schema nothing is detected.
pub fn detect_referenced_tables(blueprint: &Value, schema: Option<&SchemaIndex>) -> BTreeSet<String> {
    let Some(schema) = schema else {
        return BTreeSet::new();
    };

    let text = canonical_text(blueprint).to_lowercase();
    let found: BTreeSet<String> = schema
        .tables
        .iter()
        .filter(|table| !table.name.is_empty() && text.contains(&table.name.to_lowercase()))
        .map(|table| table.name.clone())
        .collect();

    tracing::debug!(tables = ?found, "Detected table references");
    found
}

/// Detect IDs of scenarios called from this blueprint.
///
/// Only looks for IDs when the call marker appears somewhere in the text;
/// every `"scenario": <id>` value is then collected, quoted or not.
pub fn detect_subscenario_references(blueprint: &Value) -> BTreeSet<String> {
    let text = canonical_text(blueprint);
    if !text.contains(CALL_SCENARIO_MARKER) {
        return BTreeSet::new();
    }

    let found: BTreeSet<String> =
        SCENARIO_REF.captures_iter(&text).map(|cap| cap[1].to_string()).collect();

    tracing::debug!(subscenarios = ?found, "Detected subscenario references");
    found
}

/// Compact JSON rendering used by the text heuristics.
fn canonical_text(blueprint: &Value) -> String {
    blueprint.to_string()
}

/// Pluggable reference detection.
///
/// The task builder only depends on this trait, so a precise resolver can
/// replace the text heuristics without changing the artifact contract.
pub trait ReferenceDetector {
    /// Tables referenced by the blueprint.
    fn tables(&self, blueprint: &Value, schema: Option<&SchemaIndex>) -> BTreeSet<String>;

    /// Scenario IDs called by the blueprint.
    fn subscenarios(&self, blueprint: &Value) -> BTreeSet<String>;
}

/// Substring-based detection over the serialized blueprint.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextHeuristicDetector;

impl ReferenceDetector for TextHeuristicDetector {
    fn tables(&self, blueprint: &Value, schema: Option<&SchemaIndex>) -> BTreeSet<String> {
        detect_referenced_tables(blueprint, schema)
    }

    fn subscenarios(&self, blueprint: &Value) -> BTreeSet<String> {
        detect_subscenario_references(blueprint)
    }
}
