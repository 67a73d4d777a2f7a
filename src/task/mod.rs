//! Documentation tasks.
//!
//! A task artifact bundles everything the documentation writer needs for one
//! scenario: metadata, the verbatim blueprint, what the analyzer detected and
//! the slice of the database schema the blueprint touches.

mod builder;
mod store;

pub use builder::{
    BatchFailure, BatchItem, BatchOutcome, BatchReport, FlowSource, SnapshotDir, TaskBuilder,
    TaskFilter,
};
pub use store::{TaskStore, TASK_FILE_SUFFIX};

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::flow::FlowError;
use crate::schema::TableDescriptor;

/// Result type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors that can occur while preparing a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Flow-definition file not found.
    #[error("Blueprint not found: {0}")]
    NotFound(PathBuf),

    /// Blueprint is not valid JSON.
    #[error("Invalid blueprint JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Blueprint JSON does not describe a flow.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the artifact failed.
    #[error("Failed to write task: {0:#}")]
    Write(anyhow::Error),
}

/// The bundle handed to the documentation writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskArtifact {
    pub scenario_id: u64,
    pub scenario_name: String,
    pub category: String,
    pub is_active: bool,

    /// Scenario kind from the manifest
    #[serde(rename = "type")]
    pub kind: String,

    /// Modules in the flow, nested routes included
    pub module_count: usize,

    /// Tables the blueprint appears to mention (heuristic)
    pub tables_detected: BTreeSet<String>,

    /// Scenario IDs the blueprint appears to call (heuristic)
    pub subscenarios_detected: BTreeSet<String>,

    /// The flow definition, verbatim
    pub blueprint: Value,

    /// Descriptors of the detected tables, empty without a schema
    pub relevant_db_schema: Vec<TableDescriptor>,

    pub prepared_at: NaiveDateTime,
}

impl TaskArtifact {
    /// Serialized form written to disk.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }
}
