//! # Template Service Module
//!
//! Aggregates the endpoints under `/api/templates`: storing uploaded `.docx`
//! templates, listing them and reading their placeholders.
//!
//! ## Sub-modules:
//! - `repository`: SQLite persistence of template packages and metadata.
//! - `upload`: multipart upload (`json` metadata part, then `file` part).
//! - `save`: JSON upload carrying the package as base64.
//! - `get`: listing, metadata and placeholder extraction.

mod get;
pub mod repository;
mod save;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`POST /upload`**: multipart upload; responds `201` with the stored `Template`.
/// *   **`POST /save`**: same as `/upload` with a `SaveTemplateRequest` JSON body.
/// *   **`GET /`**: every template's metadata, newest first.
/// *   **`GET /{template_id}`**: one template's metadata, `404` if unknown.
/// *   **`GET /{template_id}/placeholders`**: the template's `PlaceholderSet`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/save", post().to(save::process))
        .route("", get().to(get::list))
        .route("/", get().to(get::list))
        .route("/{template_id}", get().to(get::process))
        .route("/{template_id}/placeholders", get().to(get::placeholders))
}
