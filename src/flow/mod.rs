//! Scenario flow definitions and their analysis.
//!
//! - `Blueprint` - verbatim document plus a typed module tree
//! - `count_modules` - recursive module count including routes
//! - `detect_referenced_tables` / `detect_subscenario_references` - text heuristics

mod analyzer;
mod blueprint;

pub use analyzer::{
    count_modules, detect_referenced_tables, detect_subscenario_references, ReferenceDetector,
    TextHeuristicDetector, CALL_SCENARIO_MARKER,
};
pub use blueprint::{Blueprint, Flow, FlowError, FlowNode, Route, MAX_FLOW_DEPTH};
