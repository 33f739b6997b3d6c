use serde::{Deserialize, Serialize};

/// A persisted binding of one placeholder to one `table.column`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldMapping {
    pub template_id: i64,
    /// Placeholder name without braces.
    pub field_name: String,
    pub db_column: String,
    pub table_name: String,
}

/// One row of the mapping table as edited by the operator.
///
/// `table_name` may be left out, in which case the owning table is looked up
/// from the column name. Rows that cannot be completed are skipped on save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingDraft {
    pub field_name: String,
    pub db_column: String,
    #[serde(default)]
    pub table_name: Option<String>,
}

/// Outcome of replacing the mapping set of a template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingSaveSummary {
    pub template_id: i64,
    pub saved: usize,
    pub skipped: usize,
}
