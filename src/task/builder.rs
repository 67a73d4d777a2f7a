//! Task preparation.
//!
//! Resolves a scenario's blueprint, runs the flow analysis, slices the schema
//! and persists the resulting artifact. Batch preparation isolates every
//! scenario: one bad blueprint is counted and reported, never propagated.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use super::{TaskArtifact, TaskError, TaskResult, TaskStore};
use crate::core::Config;
use crate::flow::{count_modules, Blueprint, ReferenceDetector, TextHeuristicDetector};
use crate::manifest::ScenarioManifestEntry;
use crate::schema::SchemaIndex;

/// Resolves a manifest entry to its blueprint.
pub trait FlowSource {
    /// Load the blueprint for a scenario, or `TaskError::NotFound`.
    fn resolve(&self, entry: &ScenarioManifestEntry) -> TaskResult<Blueprint>;
}

/// Blueprints stored as files inside an exported snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    /// Create a source rooted at the snapshot directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FlowSource for SnapshotDir {
    fn resolve(&self, entry: &ScenarioManifestEntry) -> TaskResult<Blueprint> {
        let path = self.root.join(&entry.filename);
        if !path.is_file() {
            return Err(TaskError::NotFound(path));
        }
        Blueprint::load(&path)
    }
}

/// Which manifest entries a batch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    /// A single scenario
    ById(u64),
    /// Scenarios switched on in the platform
    ActiveOnly,
    /// Every scenario
    All,
}

impl TaskFilter {
    /// Whether the filter selects this entry.
    pub fn matches(&self, entry: &ScenarioManifestEntry) -> bool {
        match self {
            Self::ById(id) => entry.id == *id,
            Self::ActiveOnly => entry.is_active,
            Self::All => true,
        }
    }

    /// Entries selected by the filter, in manifest order.
    pub fn select<'a>(&self, entries: &'a [ScenarioManifestEntry]) -> Vec<&'a ScenarioManifestEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Outcome of one scenario in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Artifact written to the given path
    Prepared(PathBuf),
    /// Blueprint file missing
    Skipped(String),
    /// Blueprint unreadable or artifact not written
    Failed(String),
}

impl BatchOutcome {
    /// Short status label for progress lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prepared(_) => "OK",
            Self::Skipped(_) => "SKIP",
            Self::Failed(_) => "ERROR",
        }
    }
}

/// Progress notification for one scenario of a batch.
#[derive(Debug)]
pub struct BatchItem<'a> {
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub entry: &'a ScenarioManifestEntry,
    pub outcome: &'a BatchOutcome,
}

/// A scenario that could not be prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub scenario_id: u64,
    pub reason: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Entries selected by the filter
    pub selected: usize,
    /// Artifacts written
    pub succeeded: usize,
    /// Skipped or failed scenarios
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of scenarios not prepared.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// `(success_count, error_count)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.succeeded, self.failed())
    }
}

/// Builds and persists task artifacts.
#[derive(Debug, Clone)]
pub struct TaskBuilder<S = SnapshotDir, D = TextHeuristicDetector> {
    source: S,
    store: TaskStore,
    detector: D,
}

impl TaskBuilder {
    /// Builder reading from the configured snapshot and writing to the
    /// configured tasks directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SnapshotDir::new(&config.paths.snapshot_dir),
            TaskStore::new(&config.paths.tasks_dir),
        )
    }
}

impl<S: FlowSource> TaskBuilder<S> {
    /// Create a builder using the text heuristics for reference detection.
    pub fn new(source: S, store: TaskStore) -> Self {
        Self { source, store, detector: TextHeuristicDetector }
    }
}

impl<S: FlowSource, D: ReferenceDetector> TaskBuilder<S, D> {
    /// Swap the reference detector.
    pub fn with_detector<D2: ReferenceDetector>(self, detector: D2) -> TaskBuilder<S, D2> {
        TaskBuilder { source: self.source, store: self.store, detector }
    }

    /// Artifact storage.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Assemble the artifact for a scenario without writing it.
    pub fn prepare(
        &self,
        entry: &ScenarioManifestEntry,
        schema: Option<&SchemaIndex>,
    ) -> TaskResult<TaskArtifact> {
        self.prepare_at(entry, schema, Local::now().naive_local())
    }

    /// Assemble the artifact with an explicit preparation time.
    pub fn prepare_at(
        &self,
        entry: &ScenarioManifestEntry,
        schema: Option<&SchemaIndex>,
        prepared_at: NaiveDateTime,
    ) -> TaskResult<TaskArtifact> {
        let blueprint = self.source.resolve(entry)?;

        let module_count = count_modules(blueprint.flow());
        let tables_detected = self.detector.tables(blueprint.raw(), schema);
        let subscenarios_detected = self.detector.subscenarios(blueprint.raw());
        let relevant_db_schema =
            schema.map(|index| index.slice(&tables_detected)).unwrap_or_default();

        tracing::debug!(
            scenario = entry.id,
            modules = module_count,
            tables = tables_detected.len(),
            subscenarios = subscenarios_detected.len(),
            "Analyzed blueprint"
        );

        Ok(TaskArtifact {
            scenario_id: entry.id,
            scenario_name: entry.name.clone(),
            category: entry.category.clone(),
            is_active: entry.is_active,
            kind: entry.kind.clone(),
            module_count,
            tables_detected,
            subscenarios_detected,
            blueprint: blueprint.into_raw(),
            relevant_db_schema,
            prepared_at,
        })
    }

    /// Prepare and persist the task for one scenario.
    ///
    /// Any previous artifact for the scenario is replaced.
    pub fn build_task(
        &self,
        entry: &ScenarioManifestEntry,
        schema: Option<&SchemaIndex>,
    ) -> TaskResult<TaskArtifact> {
        let artifact = self.prepare(entry, schema)?;
        self.store.write(&artifact)?;
        Ok(artifact)
    }

    /// Prepare tasks for every entry selected by `filter`.
    ///
    /// `on_item` is called after each scenario with its outcome.
    pub fn build_batch<F>(
        &self,
        entries: &[ScenarioManifestEntry],
        filter: TaskFilter,
        schema: Option<&SchemaIndex>,
        mut on_item: F,
    ) -> BatchReport
    where
        F: FnMut(&BatchItem<'_>),
    {
        let selected = filter.select(entries);
        let total = selected.len();
        let mut report = BatchReport { selected: total, ..BatchReport::default() };

        tracing::info!(total, ?filter, "Preparing tasks");

        for (i, entry) in selected.into_iter().enumerate() {
            let outcome = match self.build_task(entry, schema) {
                Ok(_) => BatchOutcome::Prepared(self.store.path(entry.id)),
                Err(TaskError::NotFound(path)) => {
                    tracing::warn!(scenario = entry.id, path = %path.display(), "Blueprint not found");
                    BatchOutcome::Skipped(format!("Blueprint not found: {}", path.display()))
                }
                Err(e) => {
                    tracing::warn!(scenario = entry.id, error = %e, "Task preparation failed");
                    BatchOutcome::Failed(e.to_string())
                }
            };

            match &outcome {
                BatchOutcome::Prepared(_) => report.succeeded += 1,
                BatchOutcome::Skipped(reason) | BatchOutcome::Failed(reason) => {
                    report.failures.push(BatchFailure { scenario_id: entry.id, reason: reason.clone() });
                }
            }

            on_item(&BatchItem { index: i + 1, total, entry, outcome: &outcome });
        }

        tracing::info!(succeeded = report.succeeded, failed = report.failed(), "Batch finished");
        report
    }
}
