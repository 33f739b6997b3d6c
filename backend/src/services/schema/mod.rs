//! # Schema Service Module
//!
//! Read-only endpoints over the static column whitelist, used by the mapping
//! editor to offer the `(table, column)` pairs a placeholder may be bound to.
//!
//! ## Sub-modules:
//! - `catalog`: the whitelist itself plus identifier validation.
//! - `get`: handlers returning catalog views as JSON.

pub mod catalog;
mod get;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/schema";

/// Configures and returns the Actix `Scope` for schema routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: every table with its columns.
/// *   **`GET /tables`**: table names in declaration order.
/// *   **`GET /tables/{table}`**: columns of one table, `404` if it is not whitelisted.
/// *   **`GET /columns`**: every legal `(table, column)` pair.
/// *   **`GET /columns/{column}`**: the table a column belongs to (first declaration wins).
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::describe))
        .route("/", get().to(get::describe))
        .route("/tables", get().to(get::tables))
        .route("/tables/{table}", get().to(get::table_columns))
        .route("/columns", get().to(get::pairs))
        .route("/columns/{column}", get().to(get::owning_table))
}
