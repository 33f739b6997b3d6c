//! Persistence of uploaded template packages and their metadata.
//!
//! Templates are never updated in place: uploading the same document again
//! creates a new row with a new id.

use crate::error::EngineError;
use chrono::{Local, NaiveDateTime};
use common::model::template::Template;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inserts a new template and returns its id.
///
/// # Errors
/// `InvalidInput` when the name is blank or the payload is empty.
pub fn create(
    conn: &Connection,
    name: &str,
    description: &str,
    data: &[u8],
) -> Result<i64, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::InvalidInput(
            "template name must not be empty".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(EngineError::InvalidInput(
            "template document must not be empty".to_string(),
        ));
    }

    let created_at = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();
    conn.execute(
        "INSERT INTO document_templates (name, description, template_data, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, description.trim(), data, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Every template, newest first.
pub fn list(conn: &Connection) -> Result<Vec<Template>, EngineError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, created_at FROM document_templates
         ORDER BY created_at DESC, id DESC",
    )?;
    let templates = stmt
        .query_map([], template_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(templates)
}

pub fn get(conn: &Connection, template_id: i64) -> Result<Template, EngineError> {
    conn.query_row(
        "SELECT id, name, description, created_at FROM document_templates WHERE id = ?1",
        params![template_id],
        template_from_row,
    )
    .optional()?
    .ok_or(EngineError::TemplateNotFound(template_id))
}

/// The stored document package of a template.
pub fn get_binary(conn: &Connection, template_id: i64) -> Result<Vec<u8>, EngineError> {
    let data: Option<Vec<u8>> = conn
        .query_row(
            "SELECT template_data FROM document_templates WHERE id = ?1",
            params![template_id],
            |row| row.get(0),
        )
        .optional()?;
    match data {
        None => Err(EngineError::TemplateNotFound(template_id)),
        Some(data) if data.is_empty() => Err(EngineError::EmptyTemplate(template_id)),
        Some(data) => Ok(data),
    }
}

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<Template> {
    let created_at: NaiveDateTime = row.get(3)?;
    Ok(Template {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;

    #[test]
    fn create_then_read_back() {
        let conn = test_connection();
        let id = create(&conn, "  Запрос в МВД ", "по месту рождения", b"PK-bytes").unwrap();

        let template = get(&conn, id).unwrap();
        assert_eq!(template.name, "Запрос в МВД");
        assert_eq!(template.description, "по месту рождения");
        assert_eq!(get_binary(&conn, id).unwrap(), b"PK-bytes");
    }

    #[test]
    fn re_adding_creates_a_new_id() {
        let conn = test_connection();
        let first = create(&conn, "Письмо", "", b"a").unwrap();
        let second = create(&conn, "Письмо", "", b"a").unwrap();
        assert_ne!(first, second);

        let ids: Vec<i64> = list(&conn).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn blank_name_or_empty_payload_is_rejected() {
        let conn = test_connection();
        assert!(matches!(
            create(&conn, "   ", "", b"x"),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            create(&conn, "name", "", b""),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(list(&conn).unwrap().is_empty());
    }

    #[test]
    fn missing_and_empty_templates_are_distinguished() {
        let conn = test_connection();
        assert!(matches!(get(&conn, 99), Err(EngineError::TemplateNotFound(99))));
        assert!(matches!(
            get_binary(&conn, 99),
            Err(EngineError::TemplateNotFound(99))
        ));

        conn.execute(
            "INSERT INTO document_templates (name, template_data, created_at)
             VALUES ('legacy', x'', '2024-01-01 10:00:00')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        assert!(matches!(get_binary(&conn, id), Err(EngineError::EmptyTemplate(_))));
    }
}
