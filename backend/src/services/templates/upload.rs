//! `POST /api/templates/upload`: multipart template upload.
//!
//! The form carries a `json` part with the `TemplateMeta` and a `file` part
//! with the `.docx` package. The metadata must arrive before the file.

use super::save::store_template;
use crate::error::EngineError;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::requests::TemplateMeta;
use futures_util::StreamExt;
use md5::Context;
use serde_json::from_slice;

/// Stores a template sent as a multipart form.
///
/// # Arguments
/// * `state` - Shared state with the database path and audit recorder.
/// * `payload` - The multipart stream: `json` part first, then `file`.
///
/// # Returns
/// - `201 Created` with the stored `Template` metadata.
/// - `400 Bad Request` if the metadata is missing or invalid, the file is
///   not a `.docx`, or the file is empty.
pub async fn process(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, EngineError> {
    let mut meta: Option<TemplateMeta> = None;
    let mut data: Vec<u8> = Vec::new();
    let mut md5_hasher = Context::new();
    let mut file_received = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| EngineError::InvalidInput(e.to_string()))?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk.map_err(|e| EngineError::InvalidInput(e.to_string()))?);
                }
                meta = Some(from_slice(&bytes).map_err(|e| {
                    EngineError::InvalidInput(format!("invalid template metadata: {}", e))
                })?);
            }

            Some("file") => {
                if meta.is_none() {
                    return Err(EngineError::InvalidInput(
                        "template metadata must be sent before the file".to_string(),
                    ));
                }
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if !filename.to_lowercase().ends_with(".docx") {
                    return Err(EngineError::InvalidInput(
                        "the file must end with .docx".to_string(),
                    ));
                }

                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| EngineError::InvalidInput(e.to_string()))?;
                    md5_hasher.consume(&chunk);
                    data.extend_from_slice(&chunk);
                }
                file_received = true;
            }

            _ => {}
        }
    }

    let meta = meta.ok_or_else(|| EngineError::InvalidInput("missing template metadata".to_string()))?;
    if !file_received {
        return Err(EngineError::InvalidInput("missing template file".to_string()));
    }

    let digest = format!("{:x}", md5_hasher.finalize());
    let conn = state.connect()?;
    let template = store_template(
        &conn,
        state.audit.as_ref(),
        &meta.name,
        &meta.description,
        &data,
        &digest,
    )?;
    Ok(HttpResponse::Created().json(template))
}
