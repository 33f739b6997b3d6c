//! SQLite connection handling and schema creation.
//!
//! The case-data tables are generated from the schema catalog so that every
//! whitelisted `(table, column)` pair exists in the database.

use crate::services::schema::catalog::{self, ROOT_TABLE};
use rusqlite::Connection;
use std::path::Path;

const BASE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS krd (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    status_id INTEGER,
    last_service_place_id INTEGER,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS document_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    template_data BLOB NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS field_mappings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    template_id INTEGER NOT NULL REFERENCES document_templates(id) ON DELETE CASCADE,
    field_name TEXT NOT NULL,
    db_column TEXT NOT NULL,
    table_name TEXT NOT NULL,
    UNIQUE (template_id, field_name)
);

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    username TEXT,
    action_type TEXT NOT NULL,
    table_name TEXT NOT NULL,
    record_id INTEGER,
    krd_id INTEGER,
    old_values TEXT,
    new_values TEXT,
    description TEXT NOT NULL
);
"#;

/// Opens the database file with foreign keys enforced.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Creates every table the engine reads or writes. Safe to run repeatedly.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(BASE_SCHEMA)?;
    conn.execute_batch(&case_tables_ddl())
}

fn case_tables_ddl() -> String {
    catalog::TABLES
        .iter()
        .filter(|t| t.name != ROOT_TABLE)
        .map(|t| {
            let columns: Vec<String> = t
                .columns
                .iter()
                .map(|c| format!("    {} {}", c.name, c.kind.sql_type()))
                .collect();
            format!(
                "CREATE TABLE IF NOT EXISTS {} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    krd_id INTEGER REFERENCES krd(id) ON DELETE CASCADE,\n{}\n);\n",
                t.name,
                columns.join(",\n")
            )
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    migrate(&conn).unwrap();
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{}')", table))
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn migration_creates_every_catalog_column() {
        let conn = test_connection();
        for table in catalog::TABLES {
            let existing = table_columns(&conn, table.name);
            for column in table.columns {
                assert!(
                    existing.iter().any(|c| c == column.name),
                    "{}.{} missing",
                    table.name,
                    column.name
                );
            }
            if table.name != ROOT_TABLE {
                assert!(existing.iter().any(|c| c == "krd_id"));
            }
        }
    }

    #[test]
    fn migration_is_repeatable() {
        let conn = test_connection();
        migrate(&conn).unwrap();
        assert!(table_columns(&conn, "field_mappings").contains(&"table_name".to_string()));
    }

    #[test]
    fn open_enables_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(&dir.path().join("krd.sqlite")).unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
