//! Schema export.
//!
//! The live database read lives behind [`SchemaExtractor`]; this module only
//! decides what to write. Without a database URL a placeholder index is
//! written so that later steps can run unchanged.

use chrono::Local;

use super::{SchemaError, SchemaIndex};
use crate::core::{redact_url, write_json_atomic, Config};

/// Note stored in the placeholder schema.
pub const PLACEHOLDER_NOTE: &str = "Schema not available - configure database.url or AUTODOC_DB_URL";

/// Reads the schema from a live database.
pub trait SchemaExtractor {
    /// Extract tables, constraints, enums, functions and RLS policies.
    fn extract(&self, database_url: &str) -> anyhow::Result<SchemaIndex>;
}

/// What `dump_schema` wrote.
#[derive(Debug, Clone, PartialEq)]
pub enum DumpOutcome {
    /// No database configured; an empty placeholder was written.
    Placeholder(SchemaIndex),
    /// The schema was extracted and written.
    Extracted(SchemaIndex),
}

impl DumpOutcome {
    /// The index that was written.
    pub fn index(&self) -> &SchemaIndex {
        match self {
            Self::Placeholder(index) | Self::Extracted(index) => index,
        }
    }
}

/// Export the schema to `paths.schema_file`.
///
/// Fails only when a database is configured and extraction cannot run.
pub fn dump_schema(
    config: &Config,
    extractor: Option<&dyn SchemaExtractor>,
) -> anyhow::Result<DumpOutcome> {
    let path = &config.paths.schema_file;

    let Some(url) = config.database.url.as_deref() else {
        tracing::warn!("No database URL configured, writing placeholder schema");
        let index = SchemaIndex::placeholder(PLACEHOLDER_NOTE);
        write_json_atomic(path, &index)?;
        return Ok(DumpOutcome::Placeholder(index));
    };

    let host = redact_url(url);
    let extractor = extractor.ok_or_else(|| SchemaError::ExtractorUnavailable(host.clone()))?;

    tracing::info!(database = %host, "Extracting schema");
    let mut index = extractor.extract(url)?;
    index.validate()?;
    index.extracted_at = Some(Local::now().naive_local());
    index.database_url = Some(host);
    let index = index.with_counts();

    write_json_atomic(path, &index)?;
    tracing::info!(
        path = %path.display(),
        tables = index.tables.len(),
        functions = index.functions.len(),
        enums = index.enums.len(),
        "Schema saved"
    );

    Ok(DumpOutcome::Extracted(index))
}
