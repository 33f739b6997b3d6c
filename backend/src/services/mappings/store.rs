//! Per-template placeholder bindings.
//!
//! A save replaces the whole set: the previous rows are deleted and the new
//! ones inserted inside one transaction, so readers see either the old set or
//! the new one. Rows that cannot be bound to a whitelisted column are dropped
//! from the save instead of failing it.

use crate::error::EngineError;
use crate::services::schema::catalog;
use common::model::field_mapping::{FieldMapping, MappingDraft, MappingSaveSummary};
use common::model::place_holder::placeholder_name;
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension};

/// Mappings of a template ordered by placeholder name.
pub fn load(conn: &Connection, template_id: i64) -> Result<Vec<FieldMapping>, EngineError> {
    let mut stmt = conn.prepare(
        "SELECT template_id, field_name, db_column, table_name FROM field_mappings
         WHERE template_id = ?1 ORDER BY field_name",
    )?;
    let mappings = stmt
        .query_map(params![template_id], |row| {
            Ok(FieldMapping {
                template_id: row.get(0)?,
                field_name: row.get(1)?,
                db_column: row.get(2)?,
                table_name: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(mappings)
}

/// Turns an editor row into a storable mapping, or `None` when the row is
/// incomplete or names a pair outside the whitelist.
pub fn validate(template_id: i64, draft: &MappingDraft) -> Option<FieldMapping> {
    let field_name = placeholder_name(&draft.field_name);
    let db_column = draft.db_column.trim();
    if field_name.is_empty() || db_column.is_empty() {
        return None;
    }

    let table_name = match draft.table_name.as_deref().map(str::trim) {
        Some(table) if !table.is_empty() => {
            catalog::column(table, db_column)?;
            table
        }
        _ => catalog::table_for_column(db_column)?,
    };

    Some(FieldMapping {
        template_id,
        field_name,
        db_column: db_column.to_string(),
        table_name: table_name.to_string(),
    })
}

/// Replaces every mapping of `template_id` with the valid subset of `drafts`.
///
/// A field name given twice keeps its last row. Any storage error rolls the
/// whole replacement back.
pub fn replace_all(
    conn: &mut Connection,
    template_id: i64,
    drafts: &[MappingDraft],
) -> Result<MappingSaveSummary, EngineError> {
    let mut accepted: Vec<FieldMapping> = Vec::with_capacity(drafts.len());
    let mut skipped = 0;
    for draft in drafts {
        match validate(template_id, draft) {
            Some(mapping) => {
                match accepted.iter_mut().find(|m| m.field_name == mapping.field_name) {
                    Some(existing) => *existing = mapping,
                    None => accepted.push(mapping),
                }
            }
            None => {
                warn!(
                    "Skipping mapping row {:?} -> {:?}.{:?} for template {}",
                    draft.field_name, draft.table_name, draft.db_column, template_id
                );
                skipped += 1;
            }
        }
    }

    let tx = conn.transaction()?;
    let removed = tx.execute(
        "DELETE FROM field_mappings WHERE template_id = ?1",
        params![template_id],
    )?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO field_mappings (template_id, field_name, db_column, table_name)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for mapping in &accepted {
            insert.execute(params![
                mapping.template_id,
                mapping.field_name,
                mapping.db_column,
                mapping.table_name
            ])?;
        }
    }
    tx.commit()?;

    debug!("template {}: replaced {} mapping rows", template_id, removed);
    info!(
        "Saved {} mappings for template {} ({} skipped)",
        accepted.len(),
        template_id,
        skipped
    );
    Ok(MappingSaveSummary {
        template_id,
        saved: accepted.len(),
        skipped,
    })
}

/// Removes one mapping and returns it.
pub fn delete(
    conn: &Connection,
    template_id: i64,
    field_name: &str,
) -> Result<FieldMapping, EngineError> {
    let field_name = placeholder_name(field_name);
    let existing = conn
        .query_row(
            "SELECT db_column, table_name FROM field_mappings
             WHERE template_id = ?1 AND field_name = ?2",
            params![template_id, field_name],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((db_column, table_name)) = existing else {
        return Err(EngineError::MappingNotFound(template_id, field_name));
    };

    conn.execute(
        "DELETE FROM field_mappings WHERE template_id = ?1 AND field_name = ?2",
        params![template_id, field_name],
    )?;
    Ok(FieldMapping {
        template_id,
        field_name,
        db_column,
        table_name,
    })
}
