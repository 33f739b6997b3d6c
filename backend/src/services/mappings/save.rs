//! # Mapping Handlers
//!
//! Load, replace and delete the field mappings of a template. Every change is
//! written to the audit trail: a save is compared with the previous set and
//! produces one `MAPPING_CREATE`, `MAPPING_UPDATE` or `MAPPING_DELETE` entry
//! per field that actually changed.

use super::store;
use crate::audit::AuditEntry;
use crate::error::EngineError;
use crate::services::templates::repository;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::field_mapping::FieldMapping;
use common::requests::SaveMappingsRequest;

/// `GET /api/mappings/{template_id}`: the stored mappings in save order.
///
/// # Returns
/// - `200 OK` with a JSON array of `FieldMapping`.
/// - `404 Not Found` if the template does not exist.
pub async fn load(
    state: web::Data<AppState>,
    template_id: web::Path<i64>,
) -> Result<HttpResponse, EngineError> {
    let conn = state.connect()?;
    repository::get(&conn, *template_id)?;
    Ok(HttpResponse::Ok().json(store::load(&conn, *template_id)?))
}

/// `PUT /api/mappings/{template_id}`: replaces the template's mapping set and
/// audits what changed relative to the previous set.
///
/// # Arguments
/// * `template_id` - Template whose mappings are replaced, from the URL path.
/// * `payload` - The complete new set. Rows naming an unknown table or column
///   are skipped and counted.
///
/// # Returns
/// - `200 OK` with a `MappingSaveSummary` (`saved`, `skipped`).
/// - `404 Not Found` if the template does not exist.
/// - `503 Service Unavailable` if the transaction fails; the old set is kept.
pub async fn process(
    state: web::Data<AppState>,
    template_id: web::Path<i64>,
    payload: web::Json<SaveMappingsRequest>,
) -> Result<HttpResponse, EngineError> {
    let template_id = template_id.into_inner();
    let mut conn = state.connect()?;
    repository::get(&conn, template_id)?;

    let before = store::load(&conn, template_id)?;
    let summary = store::replace_all(&mut conn, template_id, &payload.mappings)?;
    let after = store::load(&conn, template_id)?;

    for entry in diff(template_id, &before, &after) {
        state.audit.record(entry);
    }
    Ok(HttpResponse::Ok().json(summary))
}

/// `DELETE /api/mappings/{template_id}/{field_name}`.
///
/// # Returns
/// - `204 No Content` once the mapping is gone and the deletion is audited.
/// - `404 Not Found` if the template has no mapping for that field.
pub async fn remove(
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse, EngineError> {
    let (template_id, field_name) = path.into_inner();
    let conn = state.connect()?;
    let removed = store::delete(&conn, template_id, &field_name)?;
    state.audit.record(AuditEntry::mapping_deleted(
        template_id,
        &removed.field_name,
        &removed.table_name,
        &removed.db_column,
    ));
    Ok(HttpResponse::NoContent().finish())
}

/// Audit entries turning `before` into `after`.
fn diff(template_id: i64, before: &[FieldMapping], after: &[FieldMapping]) -> Vec<AuditEntry> {
    let mut entries = Vec::new();
    for new in after {
        match before.iter().find(|old| old.field_name == new.field_name) {
            None => entries.push(AuditEntry::mapping_created(
                template_id,
                &new.field_name,
                &new.table_name,
                &new.db_column,
            )),
            Some(old) if old.table_name != new.table_name || old.db_column != new.db_column => {
                entries.push(AuditEntry::mapping_updated(
                    template_id,
                    &new.field_name,
                    (old.table_name.as_str(), old.db_column.as_str()),
                    (new.table_name.as_str(), new.db_column.as_str()),
                ))
            }
            Some(_) => {}
        }
    }
    for old in before {
        if !after.iter().any(|new| new.field_name == old.field_name) {
            entries.push(AuditEntry::mapping_deleted(
                template_id,
                &old.field_name,
                &old.table_name,
                &old.db_column,
            ));
        }
    }
    entries
}
