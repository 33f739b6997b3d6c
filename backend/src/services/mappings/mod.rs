//! # Mapping Service Module
//!
//! Endpoints under `/api/mappings` that bind a template's placeholders to
//! whitelisted `(table, column)` pairs.
//!
//! ## Sub-modules:
//! - `store`: validation and transactional persistence of mapping sets.
//! - `save`: HTTP handlers, including the audit of what a save changed.

mod save;
pub mod store;

use actix_web::web::{delete, get, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/mappings";

/// # Registered Routes:
///
/// *   **`GET /{template_id}`**: the template's mappings ordered by placeholder name.
/// *   **`PUT /{template_id}`**: replaces the whole set with a `SaveMappingsRequest`;
///     responds with a `MappingSaveSummary` (rows saved, rows skipped as invalid).
/// *   **`DELETE /{template_id}/{field_name}`**: removes one mapping.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{template_id}", get().to(save::load))
        .route("/{template_id}", put().to(save::process))
        .route("/{template_id}/{field_name}", delete().to(save::remove))
}
