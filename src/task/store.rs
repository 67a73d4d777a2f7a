//! Task artifact storage.

use std::fs;
use std::path::{Path, PathBuf};

use super::{TaskArtifact, TaskError, TaskResult};
use crate::core::write_file_atomic;

/// Suffix of every task artifact file name.
pub const TASK_FILE_SUFFIX: &str = "_task.json";

/// Directory of task artifacts, one `<scenario_id>_task.json` per scenario.
#[derive(Debug, Clone)]
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// Create a store rooted at `dir`. Nothing is created until a write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for a scenario.
    pub fn path(&self, scenario_id: u64) -> PathBuf {
        self.dir.join(format!("{scenario_id}{TASK_FILE_SUFFIX}"))
    }

    /// Whether a task has been prepared for the scenario.
    pub fn exists(&self, scenario_id: u64) -> bool {
        self.path(scenario_id).is_file()
    }

    /// Write an artifact, replacing any previous one.
    pub fn write(&self, artifact: &TaskArtifact) -> TaskResult<PathBuf> {
        let path = self.path(artifact.scenario_id);
        let content = artifact.to_json().map_err(|e| TaskError::Write(e.into()))?;
        write_file_atomic(&path, &content).map_err(TaskError::Write)?;
        tracing::debug!(path = %path.display(), "Task written");
        Ok(path)
    }

    /// Number of prepared tasks on disk.
    pub fn count(&self) -> usize {
        fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.file_name().to_string_lossy().ends_with(TASK_FILE_SUFFIX))
                    .count()
            })
            .unwrap_or(0)
    }
}
