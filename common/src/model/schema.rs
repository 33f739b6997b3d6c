use serde::{Deserialize, Serialize};

/// A whitelisted source table and its selectable columns, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaTable {
    pub name: String,
    pub columns: Vec<String>,
}

/// A single `(table, column)` pair that may be bound to a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaColumn {
    pub table_name: String,
    pub column_name: String,
}
