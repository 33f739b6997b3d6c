//! Fire-and-forget audit trail.
//!
//! The engine reports template, mapping and document actions through the
//! `AuditRecorder` trait. Recording never fails from the caller's point of
//! view: a recorder that cannot write logs the problem and returns.

use chrono::Local;
use log::{debug, warn};
use rusqlite::{params, Connection};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    TemplateCreate,
    TemplateView,
    MappingCreate,
    MappingUpdate,
    MappingDelete,
    DocumentGenerate,
    DocumentSave,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::TemplateCreate => "TEMPLATE_CREATE",
            AuditAction::TemplateView => "TEMPLATE_VIEW",
            AuditAction::MappingCreate => "MAPPING_CREATE",
            AuditAction::MappingUpdate => "MAPPING_UPDATE",
            AuditAction::MappingDelete => "MAPPING_DELETE",
            AuditAction::DocumentGenerate => "DOCUMENT_GENERATE",
            AuditAction::DocumentSave => "DOCUMENT_SAVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub table_name: &'static str,
    pub record_id: Option<i64>,
    pub krd_id: Option<i64>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub description: String,
}

impl AuditEntry {
    fn new(action: AuditAction, table_name: &'static str, description: String) -> Self {
        Self {
            action,
            table_name,
            record_id: None,
            krd_id: None,
            old_values: None,
            new_values: None,
            description,
        }
    }

    pub fn template_created(
        template_id: i64,
        name: &str,
        description: &str,
        size: usize,
        md5: &str,
    ) -> Self {
        Self {
            record_id: Some(template_id),
            new_values: Some(json!({
                "name": name,
                "description": description,
                "file_size": size,
                "md5": md5,
            })),
            ..Self::new(
                AuditAction::TemplateCreate,
                "document_templates",
                format!("Created document template \"{}\" ({} bytes)", name, size),
            )
        }
    }

    pub fn template_viewed(template_id: i64, name: &str) -> Self {
        Self {
            record_id: Some(template_id),
            ..Self::new(
                AuditAction::TemplateView,
                "document_templates",
                format!("Viewed document template \"{}\"", name),
            )
        }
    }

    pub fn mapping_created(template_id: i64, field_name: &str, table: &str, column: &str) -> Self {
        Self {
            new_values: Some(json!({
                "template_id": template_id,
                "field_name": field_name,
                "db_column": column,
                "table_name": table,
            })),
            ..Self::new(
                AuditAction::MappingCreate,
                "field_mappings",
                format!("Mapped \"{{{{{}}}}}\" to {}.{}", field_name, table, column),
            )
        }
    }

    pub fn mapping_updated(
        template_id: i64,
        field_name: &str,
        old: (&str, &str),
        new: (&str, &str),
    ) -> Self {
        Self {
            old_values: Some(json!({
                "template_id": template_id,
                "field_name": field_name,
                "table_name": old.0,
                "db_column": old.1,
            })),
            new_values: Some(json!({
                "template_id": template_id,
                "field_name": field_name,
                "table_name": new.0,
                "db_column": new.1,
            })),
            ..Self::new(
                AuditAction::MappingUpdate,
                "field_mappings",
                format!(
                    "Remapped \"{{{{{}}}}}\" from {}.{} to {}.{}",
                    field_name, old.0, old.1, new.0, new.1
                ),
            )
        }
    }

    pub fn mapping_deleted(template_id: i64, field_name: &str, table: &str, column: &str) -> Self {
        Self {
            old_values: Some(json!({
                "template_id": template_id,
                "field_name": field_name,
                "db_column": column,
                "table_name": table,
            })),
            ..Self::new(
                AuditAction::MappingDelete,
                "field_mappings",
                format!("Removed mapping \"{{{{{}}}}}\" -> {}.{}", field_name, table, column),
            )
        }
    }

    pub fn document_generated(krd_id: i64, template_name: &str, replacements: usize) -> Self {
        Self {
            krd_id: Some(krd_id),
            new_values: Some(json!({
                "template_name": template_name,
                "replacement_count": replacements,
            })),
            ..Self::new(
                AuditAction::DocumentGenerate,
                "documents",
                format!(
                    "Generated document from template \"{}\" for KRD-{}",
                    template_name, krd_id
                ),
            )
        }
    }

    pub fn document_saved(krd_id: Option<i64>, file_name: &str) -> Self {
        let owner = krd_id
            .map(|id| format!(" for KRD-{}", id))
            .unwrap_or_default();
        Self {
            krd_id,
            new_values: Some(json!({ "filename": file_name })),
            ..Self::new(
                AuditAction::DocumentSave,
                "documents",
                format!("Saved document \"{}\"{}", file_name, owner),
            )
        }
    }
}

/// Sink for audit entries. Implementations must not panic and must not
/// report failures back to the caller.
pub trait AuditRecorder: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Writes entries into the `audit_log` table.
pub struct SqliteAuditRecorder {
    database_path: PathBuf,
    operator: String,
}

impl SqliteAuditRecorder {
    pub fn new(database_path: PathBuf, operator: String) -> Self {
        Self {
            database_path,
            operator,
        }
    }

    fn try_record(&self, entry: &AuditEntry) -> rusqlite::Result<()> {
        let conn = crate::db::open(&self.database_path)?;
        insert_entry(&conn, &self.operator, entry)
    }
}

impl AuditRecorder for SqliteAuditRecorder {
    fn record(&self, entry: AuditEntry) {
        match self.try_record(&entry) {
            Ok(()) => debug!("audit {}: {}", entry.action.as_str(), entry.description),
            Err(e) => warn!(
                "Audit entry {} dropped ({}): {}",
                entry.action.as_str(),
                entry.description,
                e
            ),
        }
    }
}

pub(crate) fn insert_entry(
    conn: &Connection,
    operator: &str,
    entry: &AuditEntry,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO audit_log (created_at, username, action_type, table_name, record_id, krd_id, old_values, new_values, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            Local::now().naive_local(),
            operator,
            entry.action.as_str(),
            entry.table_name,
            entry.record_id,
            entry.krd_id,
            entry.old_values.as_ref().map(Value::to_string),
            entry.new_values.as_ref().map(Value::to_string),
            entry.description,
        ],
    )?;
    Ok(())
}

/// Keeps entries in memory so tests can assert on what was recorded.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryAuditRecorder {
    entries: std::sync::Mutex<Vec<AuditEntry>>,
}

#[cfg(test)]
impl MemoryAuditRecorder {
    pub(crate) fn actions(&self) -> Vec<AuditAction> {
        self.entries.lock().unwrap().iter().map(|e| e.action).collect()
    }

    pub(crate) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl AuditRecorder for MemoryAuditRecorder {
    fn record(&self, entry: AuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}
