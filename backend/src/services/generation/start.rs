//! # Document Generation
//!
//! `POST /api/generation/{template_id}` fills a template with the data of one
//! case and keeps the result in the output directory until the operator saves
//! or downloads it.
//!
//! ## Workflow:
//!
//! 1.  **HTTP Request**: `process` receives a `GenerateRequest` naming the case
//!     (`krd_id`).
//! 2.  **Blocking work**: the handler moves everything else to
//!     `tokio::task::spawn_blocking`, since it reads SQLite and rewrites a ZIP
//!     package.
//! 3.  **Resolution**: `resolver::resolve` turns the template's mappings into
//!     a placeholder → value context for the case.
//! 4.  **Rendering**: `docx::render` substitutes the context into a copy of the
//!     stored template.
//! 5.  **Output**: the new package is written as `<document_id>.docx` in the
//!     output directory. The id is `<krd_id>_<uuid>`, so saving it later can
//!     still name the case. A `GenerationSummary` is returned, including the
//!     file name the save dialog should suggest.
//!
//! `GET /api/generation/{template_id}/context?krd_id=N` runs step 3 alone so
//! the operator can check the values before generating.

use super::resolver;
use crate::audit::{AuditEntry, AuditRecorder};
use crate::docx;
use crate::error::EngineError;
use crate::services::templates::repository;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use chrono::Local;
use common::model::generation::{GenerationSummary, ResolutionContext};
use common::requests::GenerateRequest;
use log::info;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub(crate) async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<i64>,
    payload: web::Json<GenerateRequest>,
) -> Result<HttpResponse, EngineError> {
    let template_id = template_id.into_inner();
    let krd_id = payload.krd_id;
    let state = state.into_inner();

    let handle = tokio::task::spawn_blocking(move || {
        let conn = state.connect()?;
        generate_document(
            &conn,
            state.audit.as_ref(),
            &state.config.output_dir,
            template_id,
            krd_id,
        )
    });
    let summary = handle
        .await
        .map_err(|e| EngineError::Task(format!("generation task join error: {}", e)))??;
    Ok(HttpResponse::Ok().json(summary))
}

pub(crate) async fn preview_context(
    state: web::Data<AppState>,
    template_id: web::Path<i64>,
    query: web::Query<GenerateRequest>,
) -> Result<HttpResponse, EngineError> {
    let conn = state.connect()?;
    let context = resolve_for_template(&conn, *template_id, query.krd_id)?;
    Ok(HttpResponse::Ok().json(context))
}

fn resolve_for_template(
    conn: &Connection,
    template_id: i64,
    krd_id: i64,
) -> Result<ResolutionContext, EngineError> {
    repository::get(conn, template_id)?;
    resolver::resolve(conn, template_id, krd_id)
}

/// Renders `template_id` for case `krd_id` into `output_dir`.
///
/// # Arguments
/// * `conn` - Open connection to the case database.
/// * `audit` - Recorder for the `DOCUMENT_GENERATE` entry.
/// * `output_dir` - Directory the generated file is written to.
/// * `template_id` - Stored template to fill.
/// * `krd_id` - Case whose data fills the placeholders.
///
/// # Returns
/// - `Ok(GenerationSummary)` with the document id and replacement count.
/// - `Err(EngineError::TemplateNotFound)` or `Err(EngineError::EmptyTemplate)`
///   if the template cannot be used.
/// - `Err(EngineError::Package)` if the stored package cannot be parsed. No
///   file is written in that case.
pub fn generate_document(
    conn: &Connection,
    audit: &dyn AuditRecorder,
    output_dir: &Path,
    template_id: i64,
    krd_id: i64,
) -> Result<GenerationSummary, EngineError> {
    let template = repository::get(conn, template_id)?;
    let data = repository::get_binary(conn, template_id)?;
    let context = resolver::resolve(conn, template_id, krd_id)?;

    let rendered = docx::render(&data, &context)?;

    let document_id = format!("{}_{}", krd_id, Uuid::new_v4());
    fs::create_dir_all(output_dir)?;
    let path = document_path(output_dir, &document_id);
    fs::write(&path, &rendered.bytes)?;

    info!(
        "Generated {} from template \"{}\" for KRD-{}: {} replacements, {} bytes",
        path.display(),
        template.name,
        krd_id,
        rendered.replacement_count,
        rendered.bytes.len()
    );
    audit.record(AuditEntry::document_generated(
        krd_id,
        &template.name,
        rendered.replacement_count,
    ));

    Ok(GenerationSummary {
        document_id,
        template_name: template.name,
        replacement_count: rendered.replacement_count,
        size_bytes: rendered.bytes.len() as u64,
        suggested_file_name: format!(
            "Документ_{}_{}.docx",
            krd_id,
            Local::now().format("%Y%m%d_%H%M%S")
        ),
    })
}

/// A generated document waiting in the output directory.
#[derive(Debug)]
pub(super) struct GeneratedDocument {
    pub path: PathBuf,
    pub krd_id: i64,
}

/// Finds a generated document by id. Only `<krd_id>_<uuid>` ids are accepted,
/// so a request cannot point outside the output directory.
pub(super) fn locate(output_dir: &Path, document_id: &str) -> Result<GeneratedDocument, EngineError> {
    let invalid = || EngineError::InvalidInput(format!("'{}' is not a document id", document_id));
    let (krd, uuid) = document_id.split_once('_').ok_or_else(invalid)?;
    let krd_id: i64 = krd.parse().map_err(|_| invalid())?;
    let uuid = Uuid::parse_str(uuid).map_err(|_| invalid())?;

    let path = document_path(output_dir, &format!("{}_{}", krd_id, uuid));
    if !path.is_file() {
        return Err(EngineError::DocumentNotFound(document_id.to_string()));
    }
    Ok(GeneratedDocument { path, krd_id })
}

fn document_path(output_dir: &Path, document_id: &str) -> PathBuf {
    output_dir.join(format!("{}.docx", document_id))
}
