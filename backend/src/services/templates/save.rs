//! `POST /api/templates/save`: template upload as JSON with a base64 payload.

use super::repository;
use crate::audit::{AuditEntry, AuditRecorder};
use crate::error::EngineError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::template::Template;
use common::requests::SaveTemplateRequest;
use log::info;
use md5::Context;
use rusqlite::Connection;

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<SaveTemplateRequest>,
) -> Result<HttpResponse, EngineError> {
    let request = payload.into_inner();
    let data = decode_payload(&request.data_base64)?;

    let conn = state.connect()?;
    let digest = md5_hex(&data);
    let template = store_template(
        &conn,
        state.audit.as_ref(),
        &request.name,
        &request.description,
        &data,
        &digest,
    )?;
    Ok(HttpResponse::Created().json(template))
}

/// Accepts plain base64 as well as a `data:...;base64,` URL.
fn decode_payload(encoded: &str) -> Result<Vec<u8>, EngineError> {
    let encoded = match encoded.split_once("base64,") {
        Some((_, rest)) => rest,
        None => encoded,
    };
    BASE64
        .decode(encoded.trim())
        .map_err(|e| EngineError::InvalidInput(format!("template payload is not valid base64: {}", e)))
}

pub(super) fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Context::new();
    hasher.consume(data);
    format!("{:x}", hasher.finalize())
}

/// Stores a template and records `TEMPLATE_CREATE`. Shared by both upload paths.
pub(super) fn store_template(
    conn: &Connection,
    audit: &dyn AuditRecorder,
    name: &str,
    description: &str,
    data: &[u8],
    md5: &str,
) -> Result<Template, EngineError> {
    let id = repository::create(conn, name, description, data)?;
    let template = repository::get(conn, id)?;
    info!(
        "Stored template {} \"{}\" ({} bytes, md5 {})",
        id,
        template.name,
        data.len(),
        md5
    );
    audit.record(AuditEntry::template_created(
        id,
        &template.name,
        &template.description,
        data.len(),
        md5,
    ));
    Ok(template)
}
