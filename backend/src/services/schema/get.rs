//! # Schema Catalog Handlers
//!
//! Read-only views of the column whitelist behind the mapping editor. Nothing
//! here touches the database; every answer comes from `catalog`.
//!
//! - `describe`: every table with its columns.
//! - `tables` / `table_columns`: the two drop-downs of the editor.
//! - `pairs`: flat `(table, column)` list.
//! - `owning_table`: reverse lookup from a column to its first table.

use super::catalog;
use crate::error::EngineError;
use actix_web::{web, HttpResponse};
use common::model::schema::SchemaColumn;

pub async fn describe() -> HttpResponse {
    HttpResponse::Ok().json(catalog::describe())
}

pub async fn tables() -> HttpResponse {
    HttpResponse::Ok().json(catalog::table_names().collect::<Vec<_>>())
}

/// Columns of one whitelisted table.
///
/// # Arguments
/// * `table` - Table name from the URL path.
///
/// # Returns
/// - `200 OK` with the column names in declaration order.
/// - `404 Not Found` if the table is not in the catalog.
pub async fn table_columns(table: web::Path<String>) -> Result<HttpResponse, EngineError> {
    let table = table.into_inner();
    let columns = catalog::columns(&table).ok_or(EngineError::UnknownTable(table))?;
    Ok(HttpResponse::Ok().json(columns))
}

pub async fn pairs() -> HttpResponse {
    HttpResponse::Ok().json(catalog::all_columns())
}

/// Reverse lookup used to pre-fill the table when the operator picks a column.
///
/// # Arguments
/// * `column` - Column name from the URL path.
///
/// # Returns
/// - `200 OK` with a `SchemaColumn` naming the first table that declares it.
/// - `404 Not Found` if no whitelisted table has the column.
pub async fn owning_table(column: web::Path<String>) -> Result<HttpResponse, EngineError> {
    let column = column.into_inner();
    match catalog::table_for_column(&column) {
        Some(table) => Ok(HttpResponse::Ok().json(SchemaColumn {
            table_name: table.to_string(),
            column_name: column,
        })),
        None => Err(EngineError::UnknownColumn(column)),
    }
}

#[cfg(test)]
mod tests {
    use crate::services::schema::configure_routes;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use common::model::schema::{SchemaColumn, SchemaTable};

    #[actix_web::test]
    async fn lists_tables_and_columns() {
        let app = test::init_service(App::new().service(configure_routes())).await;

        let req = test::TestRequest::get().uri("/api/schema/tables").to_request();
        let tables: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(tables.first().map(String::as_str), Some("social_data"));
        assert_eq!(tables.last().map(String::as_str), Some("krd"));

        let req = test::TestRequest::get().uri("/api/schema/").to_request();
        let described: Vec<SchemaTable> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(described.len(), tables.len());

        let req = test::TestRequest::get()
            .uri("/api/schema/tables/garrisons")
            .to_request();
        let columns: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(columns, vec!["name"]);

        let req = test::TestRequest::get().uri("/api/schema/columns").to_request();
        let pairs: Vec<SchemaColumn> = test::call_and_read_body_json(&app, req).await;
        assert!(pairs.iter().any(|p| p.table_name == "krd" && p.column_name == "status_id"));
    }

    #[actix_web::test]
    async fn unknown_names_are_not_found() {
        let app = test::init_service(App::new().service(configure_routes())).await;

        let req = test::TestRequest::get()
            .uri("/api/schema/tables/audit_log")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/schema/columns/password_hash")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn column_lookup_returns_first_declaring_table() {
        let app = test::init_service(App::new().service(configure_routes())).await;
        let req = test::TestRequest::get()
            .uri("/api/schema/columns/surname")
            .to_request();
        let found: SchemaColumn = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.table_name, "social_data");
        assert_eq!(found.column_name, "surname");
    }
}
