//! # Generation Service Module
//!
//! Endpoints under `/api/generation` that turn a template plus one case into
//! a filled-in document.
//!
//! ## Sub-modules:
//! - `resolver`: placeholder → value context of one case.
//! - `start`: rendering into the output directory, and context preview.
//! - `save`: save-as and download of generated documents.

pub mod resolver;
mod save;
mod start;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/generation";

/// # Registered Routes:
///
/// *   **`POST /{template_id}`**: `GenerateRequest` body; renders the template
///     for the case and responds with a `GenerationSummary`.
/// *   **`GET /{template_id}/context?krd_id=N`**: the resolved context only.
/// *   **`GET /documents/{document_id}`**: the generated `.docx` as an attachment.
/// *   **`POST /documents/{document_id}/save`**: `SaveDocumentRequest` body; copies
///     the document to the given path and removes it from the output directory.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/documents/{document_id}", get().to(save::download))
        .route("/documents/{document_id}/save", post().to(save::process))
        .route("/{template_id}", post().to(start::process))
        .route("/{template_id}/context", get().to(start::preview_context))
}
