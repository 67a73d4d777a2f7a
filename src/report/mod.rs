//! Scheduling and reporting over the manifest and the progress ledger.

mod index;
mod schedule;
mod status;

pub use index::{
    render_docs_index, render_findings_index, write_indexes, IndexPaths, FINDINGS_SUFFIX,
    INDEX_FILE,
};
pub use schedule::{next, pending};
pub use status::{CategoryStatus, PendingSample, StatusReport, SAMPLES_PER_CATEGORY};
