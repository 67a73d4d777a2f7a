//! Database schema index.
//!
//! The schema index is a static export of the relational schema the
//! scenarios read from and write to. It is produced once (see [`dump_schema`])
//! and then only read: task preparation slices it down to the tables a
//! blueprint mentions.

mod dump;

pub use dump::{dump_schema, DumpOutcome, SchemaExtractor, PLACEHOLDER_NOTE};

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors specific to the schema index.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two tables share the same `schema.name` key.
    #[error("Duplicate table in schema index: {0}")]
    DuplicateTable(String),

    /// A database URL is configured but no extractor is available.
    #[error("No schema extractor available for {0}; install one or unset the database URL")]
    ExtractorUnavailable(String),
}

/// The extracted schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaIndex {
    /// When the schema was extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<NaiveDateTime>,

    /// Database host the schema came from, credentials stripped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Tables with their columns and constraints
    #[serde(default)]
    pub tables: Vec<TableDescriptor>,

    /// Enum types
    #[serde(default)]
    pub enums: Vec<EnumType>,

    /// Public functions
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,

    /// Row-level security policies keyed by `schema.table`
    #[serde(default)]
    pub rls_policies: BTreeMap<String, Vec<RlsPolicy>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_count: Option<usize>,

    /// Free-form note, set on placeholder schemas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One table of the schema.
///
/// Only the identifying keys are typed. Columns, constraints and anything
/// else the export produced stay as raw JSON so a sliced descriptor is
/// written to task artifacts exactly as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Schema (namespace) the table lives in
    pub schema: String,

    /// Table name
    pub name: String,

    /// Columns, constraints and every other exported key, kept as-is
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// A table column, as read through [`TableDescriptor::columns`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    pub name: String,

    /// SQL data type
    #[serde(rename = "type")]
    pub data_type: Option<String>,

    pub nullable: Option<bool>,

    /// Default expression
    pub default: Option<String>,

    pub comment: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A key constraint, as read through [`TableDescriptor::constraints`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraint {
    pub name: String,

    /// `PRIMARY KEY`, `FOREIGN KEY`, `UNIQUE`, ...
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub column: Option<String>,

    /// Referenced `schema.table` for foreign keys
    pub ref_table: Option<String>,

    pub ref_column: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A check constraint with its SQL definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConstraint {
    pub name: String,
    pub definition: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An enum type and its labels in sort order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A database function signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDescriptor {
    pub name: String,
    pub args: Option<String>,
    pub returns: Option<String>,
    pub comment: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A row-level security policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RlsPolicy {
    pub name: String,
    pub permissive: Option<String>,
    /// Roles as exported (list or array literal)
    pub roles: Value,
    pub command: Option<String>,
    pub using: Option<String>,
    pub with_check: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableDescriptor {
    /// Create a table with no columns.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self { schema: schema.into(), name: name.into(), details: Map::new() }
    }

    /// `schema.name` key, unique within an index.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Typed view of the `columns` list. Entries that are not objects are skipped.
    pub fn columns(&self) -> Vec<Column> {
        self.typed_list("columns")
    }

    /// Typed view of the `constraints` list.
    pub fn constraints(&self) -> Vec<Constraint> {
        self.typed_list("constraints")
    }

    /// Typed view of the `check_constraints` list.
    pub fn check_constraints(&self) -> Vec<CheckConstraint> {
        self.typed_list("check_constraints")
    }

    fn typed_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.details
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|item| T::deserialize(item).ok()).collect())
            .unwrap_or_default()
    }
}

impl SchemaIndex {
    /// Placeholder written when no database is configured.
    pub fn placeholder(note: impl Into<String>) -> Self {
        Self { note: Some(note.into()), ..Self::default() }
    }

    /// Load the schema index if the file exists.
    ///
    /// A missing file means "no schema available" and is not an error.
    pub fn load_optional(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No schema file");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let index = Self::parse(&content)
            .with_context(|| format!("Invalid schema file {}", path.display()))?;
        Ok(Some(index))
    }

    /// Parse and validate a schema index from JSON text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let index: Self = serde_json::from_str(content)?;
        index.validate()?;
        Ok(index)
    }

    /// Check that every `schema.name` key is unique.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            let key = table.qualified_name();
            if !seen.insert(key.clone()) {
                return Err(SchemaError::DuplicateTable(key));
            }
        }
        Ok(())
    }

    /// Table descriptors whose names are in `names`, in index order.
    pub fn slice(&self, names: &BTreeSet<String>) -> Vec<TableDescriptor> {
        self.tables.iter().filter(|t| names.contains(&t.name)).cloned().collect()
    }

    /// Fill in the count metadata from the current contents.
    pub fn with_counts(mut self) -> Self {
        self.table_count = Some(self.tables.len());
        self.function_count = Some(self.functions.len());
        self.enum_count = Some(self.enums.len());
        self
    }

    /// Whether the index describes no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SCHEMA: &str = r#"{
        "extracted_at": "2026-02-26T10:15:30.123456",
        "database_url": "db.example.com:5432/postgres",
        "tables": [
            {"schema": "public", "name": "users",
             "columns": [{"name": "id", "type": "uuid", "nullable": false, "default": "gen_random_uuid()", "comment": null}],
             "constraints": [{"name": "users_pkey", "type": "PRIMARY KEY", "column": "id", "ref_table": "public.users", "ref_column": "id"}]},
            {"schema": "public", "name": "orders",
             "columns": [{"name": "user_id", "type": "uuid", "nullable": true, "default": null, "comment": "owner"}],
             "check_constraints": [{"name": "orders_total_check", "definition": "CHECK ((total >= 0))"}],
             "row_estimate": 1200}
        ],
        "enums": [{"name": "order_status", "values": ["open", "paid"]}],
        "functions": [{"name": "touch", "args": "", "returns": "trigger", "comment": null}],
        "rls_policies": {"public.orders": [{"name": "own", "permissive": "PERMISSIVE", "roles": ["authenticated"], "command": "SELECT", "using": "(auth.uid() = user_id)", "with_check": null}]},
        "table_count": 2, "function_count": 1, "enum_count": 1
    }"#;

    #[test]
    fn test_parse_schema() {
        let index = SchemaIndex::parse(SCHEMA).unwrap();
        assert_eq!(index.tables.len(), 2);
        assert_eq!(index.tables[0].qualified_name(), "public.users");
        assert_eq!(index.tables[0].constraints().len(), 1);
        assert_eq!(index.tables[1].check_constraints()[0].name, "orders_total_check");
        assert_eq!(index.enums[0].values, vec!["open", "paid"]);
        assert_eq!(index.rls_policies["public.orders"][0].command.as_deref(), Some("SELECT"));
        assert!(index.extracted_at.is_some());
    }

    #[test]
    fn test_unknown_table_keys_preserved() {
        let index = SchemaIndex::parse(SCHEMA).unwrap();
        let orders = &index.tables[1];
        assert_eq!(orders.details.get("row_estimate"), Some(&serde_json::json!(1200)));

        let value = serde_json::to_value(orders).unwrap();
        assert_eq!(value["row_estimate"], 1200);
        assert!(value.get("constraints").is_none());
    }

    #[test]
    fn test_slice_keeps_descriptor_verbatim() {
        let index = SchemaIndex::parse(SCHEMA).unwrap();
        let names: BTreeSet<String> = ["orders".to_string()].into();

        let slice = index.slice(&names);
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0], index.tables[1]);
    }

    #[test]
    fn test_slice_round_trips_nested_entries_unchanged() {
        let orders = json!({
            "schema": "public",
            "name": "orders",
            "columns": [
                {"name": "id", "type": "uuid", "nullable": false, "default": null, "is_identity": true},
                {"name": "total", "type": "numeric", "precision": 12}
            ],
            "constraints": [{"name": "orders_pkey", "type": "PRIMARY KEY", "column": "id", "deferrable": false}],
            "check_constraints": [{"name": "orders_total_check", "definition": "CHECK ((total >= 0))", "validated": true}],
            "constraints_note": "exported by pg_dump"
        });
        let content = json!({"tables": [{"schema": "public", "name": "users"}, orders.clone()]}).to_string();

        let index = SchemaIndex::parse(&content).unwrap();
        let names: BTreeSet<String> = ["orders".to_string()].into();
        let slice = serde_json::to_value(index.slice(&names)).unwrap();

        assert_eq!(slice, json!([orders]));
    }

    #[test]
    fn test_irregular_column_keeps_the_index() {
        let content = r#"{"tables": [
            {"schema": "public", "name": "orders", "columns": [{"name": "id"}, "legacy", {"type": "text"}]},
            {"schema": "public", "name": "users", "columns": [{"name": "id", "type": "uuid"}]}
        ]}"#;

        let index = SchemaIndex::parse(content).unwrap();
        assert_eq!(index.tables.len(), 2);

        let columns = index.tables[0].columns();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert!(columns[0].data_type.is_none());
        assert_eq!(columns[1].data_type.as_deref(), Some("text"));
        assert_eq!(index.tables[1].columns()[0].data_type.as_deref(), Some("uuid"));
    }

    #[test]
    fn test_slice_with_no_names() {
        let index = SchemaIndex::parse(SCHEMA).unwrap();
        assert!(index.slice(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_duplicate_tables_rejected() {
        let content = r#"{"tables": [
            {"schema": "public", "name": "users"},
            {"schema": "public", "name": "users"}
        ]}"#;
        let err = SchemaIndex::parse(content).unwrap_err();
        assert!(err.to_string().contains("public.users"));
    }

    #[test]
    fn test_same_name_in_different_schemas_allowed() {
        let content = r#"{"tables": [
            {"schema": "public", "name": "users"},
            {"schema": "auth", "name": "users"}
        ]}"#;
        let index = SchemaIndex::parse(content).unwrap();
        let names: BTreeSet<String> = ["users".to_string()].into();
        assert_eq!(index.slice(&names).len(), 2);
    }

    #[test]
    fn test_load_optional_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SchemaIndex::load_optional(&dir.path().join("db_schema.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_placeholder_has_no_tables() {
        let index = SchemaIndex::placeholder("no database configured");
        assert!(index.is_empty());
        assert_eq!(index.note.as_deref(), Some("no database configured"));
    }

    #[test]
    fn test_with_counts() {
        let index = SchemaIndex::parse(SCHEMA).unwrap();
        let index = SchemaIndex { table_count: None, ..index }.with_counts();
        assert_eq!(index.table_count, Some(2));
        assert_eq!(index.function_count, Some(1));
        assert_eq!(index.enum_count, Some(1));
    }
}
