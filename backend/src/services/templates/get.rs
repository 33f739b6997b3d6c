//! # Template Retrieval Handlers
//!
//! - `list`: metadata of every stored template, newest first.
//! - `process`: metadata of one template.
//! - `placeholders`: the distinct `{{name}}` tokens of a template's document.
//!   Opening a template for mapping is what the audit trail records as a view.
//!
//! Extraction degrades to the fallback placeholder list when the stored
//! package cannot be read or is empty; the response says so through its
//! `source` field.

use super::repository;
use crate::audit::AuditEntry;
use crate::docx;
use crate::error::EngineError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, EngineError> {
    let conn = state.connect()?;
    Ok(HttpResponse::Ok().json(repository::list(&conn)?))
}

pub async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<i64>,
) -> Result<HttpResponse, EngineError> {
    let conn = state.connect()?;
    Ok(HttpResponse::Ok().json(repository::get(&conn, *template_id)?))
}

/// Placeholder tokens of a stored template, as offered to the mapping editor.
///
/// # Arguments
/// * `template_id` - The template, from the URL path.
///
/// # Returns
/// - `200 OK` with a `PlaceholderSet`. Its `source` is `fallback` when the
///   stored package is empty or cannot be read.
/// - `404 Not Found` if the template does not exist.
pub async fn placeholders(
    state: web::Data<AppState>,
    template_id: web::Path<i64>,
) -> Result<HttpResponse, EngineError> {
    let template_id = template_id.into_inner();
    let conn = state.connect()?;
    let template = repository::get(&conn, template_id)?;
    let data = match repository::get_binary(&conn, template_id) {
        Err(EngineError::EmptyTemplate(_)) => Vec::new(),
        other => other?,
    };

    let found = web::block(move || docx::extract_placeholders(&data))
        .await
        .map_err(|e| EngineError::Task(e.to_string()))?;

    state
        .audit
        .record(AuditEntry::template_viewed(template.id, &template.name));
    Ok(HttpResponse::Ok().json(found))
}
