//! # Autodoc
//!
//! Prepare and track documentation tasks for exported automation scenarios.
//!
//! Autodoc reads a snapshot of scenario blueprints, analyzes each flow
//! (module count, referenced database tables, called subscenarios) and writes
//! a self-contained task file per scenario for whoever writes the
//! documentation. A small ledger tracks which scenarios are done.
//!
//! ## Features
//!
//! - **Task preparation**: one JSON bundle per scenario with the blueprint,
//!   detected dependencies and the relevant schema slice
//! - **Progress ledger**: idempotent, crash-safe completion tracking
//! - **Scheduling**: active scenarios first, then by category and ID
//! - **Reporting**: overall and per-category progress, markdown indexes
//!
//! ## Quick Start
//!
//! ```bash
//! # Prepare every task, then see what to document first
//! autodoc prepare --all
//! autodoc next --count 5
//!
//! # After writing docs/scenarios/3730131_*.md
//! autodoc complete --id 3730131
//! autodoc status --verbose
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;
pub mod flow;
pub mod manifest;
pub mod progress;
pub mod report;
pub mod schema;
pub mod task;

// Re-export commonly used types
pub use crate::core::Config;
pub use flow::{count_modules, detect_referenced_tables, detect_subscenario_references, Blueprint};
pub use manifest::{Manifest, ScenarioManifestEntry};
pub use progress::{CompletionEvidence, ProgressLedger, ProgressRecord, ProgressStore};
pub use report::StatusReport;
pub use schema::{SchemaIndex, TableDescriptor};
pub use task::{TaskArtifact, TaskBuilder, TaskError, TaskFilter, TaskStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "autodoc";
