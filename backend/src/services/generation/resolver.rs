//! Builds the placeholder → value context of one case.
//!
//! Each mapping becomes one single-row lookup against its table. Identifiers
//! are checked against the identifier pattern and the whitelist first, and the
//! SQL text only ever contains the catalog's own static names, never the
//! strings stored in the mapping row.

use crate::error::EngineError;
use crate::services::mappings::store;
use crate::services::schema::catalog::{self, ColumnKind};
use chrono::NaiveDate;
use common::model::generation::ResolutionContext;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

const DATE_FORMAT: &str = "%d.%m.%Y";

/// Resolves every mapping of `template_id` for case `krd_id`.
///
/// Placeholders whose column is null, whose row is missing or whose binding
/// is not whitelisted are left out of the context.
pub fn resolve(
    conn: &Connection,
    template_id: i64,
    krd_id: i64,
) -> Result<ResolutionContext, EngineError> {
    let mut context = ResolutionContext::new();
    for mapping in store::load(conn, template_id)? {
        match lookup_value(conn, &mapping.table_name, &mapping.db_column, krd_id)? {
            Some(value) => {
                context.insert(mapping.field_name, value);
            }
            None => debug!(
                "{{{{{}}}}} has no value in {}.{} for KRD-{}",
                mapping.field_name, mapping.table_name, mapping.db_column, krd_id
            ),
        }
    }
    Ok(context)
}

/// Current value of `table.column` for the case, rendered as document text.
pub fn lookup_value(
    conn: &Connection,
    table_name: &str,
    column_name: &str,
    krd_id: i64,
) -> Result<Option<String>, EngineError> {
    if !catalog::is_safe_identifier(table_name) || !catalog::is_safe_identifier(column_name) {
        warn!(
            "Refusing lookup with unsafe identifier {:?}.{:?}",
            table_name, column_name
        );
        return Ok(None);
    }
    let Some(table) = catalog::table(table_name) else {
        warn!("Table {} is not whitelisted", table_name);
        return Ok(None);
    };
    let Some(column) = table.column(column_name) else {
        warn!("Column {}.{} is not whitelisted", table_name, column_name);
        return Ok(None);
    };

    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1",
        column.name,
        table.name,
        table.join_column()
    );
    let value: Option<Value> = conn
        .query_row(&sql, params![krd_id], |row| row.get(0))
        .optional()?;
    Ok(value.and_then(|v| format_value(column.kind, v)))
}

fn format_value(kind: ColumnKind, value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) if kind == ColumnKind::Flag => Some((i != 0).to_string()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(text) if kind == ColumnKind::Date => Some(format_date(text)),
        Value::Text(text) => Some(text),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// `YYYY-MM-DD` (optionally followed by a time) becomes `DD.MM.YYYY`; anything
/// else is passed through as stored.
fn format_date(stored: String) -> String {
    let date_part = stored.get(..10).unwrap_or(&stored);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format(DATE_FORMAT).to_string(),
        Err(_) => stored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::services::templates::repository;
    use common::model::field_mapping::MappingDraft;

    fn case(conn: &Connection) -> i64 {
        conn.execute("INSERT INTO krd (status_id) VALUES (3)", []).unwrap();
        let krd_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO social_data (krd_id, surname, name, patronymic, birth_date, category_id)
             VALUES (?1, 'Петров', 'Иван', NULL, '1990-02-01', 4)",
            params![krd_id],
        )
        .unwrap();
        krd_id
    }

    fn map(conn: &mut Connection, template_id: i64, rows: &[(&str, &str, &str)]) {
        let drafts: Vec<MappingDraft> = rows
            .iter()
            .map(|(field, table, column)| MappingDraft {
                field_name: field.to_string(),
                db_column: column.to_string(),
                table_name: Some(table.to_string()),
            })
            .collect();
        store::replace_all(conn, template_id, &drafts).unwrap();
    }

    #[test]
    fn resolves_mapped_columns_with_formatting() {
        let mut conn = test_connection();
        let krd_id = case(&conn);
        let template_id = repository::create(&conn, "t", "", b"PK").unwrap();
        map(
            &mut conn,
            template_id,
            &[
                ("name", "social_data", "name"),
                ("surname", "social_data", "surname"),
                ("birth_date", "social_data", "birth_date"),
                ("category", "social_data", "category_id"),
                ("patronymic", "social_data", "patronymic"),
                ("status", "krd", "status_id"),
                ("town", "addresses", "town"),
            ],
        );

        let context = resolve(&conn, template_id, krd_id).unwrap();

        assert_eq!(context["name"], "Иван");
        assert_eq!(context["surname"], "Петров");
        assert_eq!(context["birth_date"], "01.02.1990");
        assert_eq!(context["category"], "4");
        assert_eq!(context["status"], "3");
        // null column and missing address row
        assert!(!context.contains_key("patronymic"));
        assert!(!context.contains_key("town"));
    }

    #[test]
    fn root_table_joins_on_id() {
        let conn = test_connection();
        let krd_id = case(&conn);
        assert_eq!(
            lookup_value(&conn, "krd", "id", krd_id).unwrap(),
            Some(krd_id.to_string())
        );
        assert_eq!(lookup_value(&conn, "krd", "id", krd_id + 100).unwrap(), None);
    }

    #[test]
    fn unsafe_or_unlisted_identifiers_never_reach_storage() {
        let conn = test_connection();
        let krd_id = case(&conn);
        // Would fail with a storage error if the text were interpolated.
        assert_eq!(
            lookup_value(&conn, "social_data", "name FROM social_data; --", krd_id).unwrap(),
            None
        );
        assert_eq!(
            lookup_value(&conn, "social_data WHERE 1=1 OR", "name", krd_id).unwrap(),
            None
        );
        assert_eq!(lookup_value(&conn, "audit_log", "description", krd_id).unwrap(), None);
        assert_eq!(lookup_value(&conn, "social_data", "town", krd_id).unwrap(), None);
    }

    #[test]
    fn mapping_rows_edited_outside_the_store_are_not_trusted() {
        let conn = test_connection();
        let krd_id = case(&conn);
        let template_id = repository::create(&conn, "t", "", b"PK").unwrap();
        conn.execute(
            "INSERT INTO field_mappings (template_id, field_name, db_column, table_name)
             VALUES (?1, 'x', 'surname', 'social_data s JOIN users u')",
            params![template_id],
        )
        .unwrap();
        assert!(resolve(&conn, template_id, krd_id).unwrap().is_empty());
    }

    #[test]
    fn formats_by_column_kind() {
        assert_eq!(format_value(ColumnKind::Flag, Value::Integer(1)), Some("true".into()));
        assert_eq!(format_value(ColumnKind::Flag, Value::Integer(0)), Some("false".into()));
        assert_eq!(
            format_value(ColumnKind::Date, Value::Text("2024-03-09 00:00:00".into())),
            Some("09.03.2024".into())
        );
        assert_eq!(
            format_value(ColumnKind::Date, Value::Text("09.03.2024".into())),
            Some("09.03.2024".into())
        );
        assert_eq!(format_value(ColumnKind::Text, Value::Null), None);
        assert_eq!(format_value(ColumnKind::Number, Value::Real(2.5)), Some("2.5".into()));
    }
}
