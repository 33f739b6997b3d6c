//! Delivery of generated documents: save-as to an operator-chosen path, or a
//! plain download.

use super::start::locate;
use crate::audit::{AuditEntry, AuditRecorder};
use crate::error::EngineError;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use common::requests::SaveDocumentRequest;
use log::{info, warn};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub(crate) async fn process(
    state: web::Data<AppState>,
    document_id: web::Path<String>,
    payload: web::Json<SaveDocumentRequest>,
) -> Result<HttpResponse, EngineError> {
    let saved = save_document(
        state.audit.as_ref(),
        &state.config.output_dir,
        &document_id,
        Path::new(payload.path.trim()),
    )?;
    Ok(HttpResponse::Ok().json(json!({ "path": saved })))
}

pub(crate) async fn download(
    state: web::Data<AppState>,
    document_id: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let document = locate(&state.config.output_dir, &document_id)?;
    let bytes = fs::read(&document.path)?;
    Ok(HttpResponse::Ok()
        .content_type(DOCX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format!("{}.docx", document_id))],
        })
        .body(bytes))
}

/// Copies a generated document to `target` and drops it from the output
/// directory. The audit entry names the case the document was generated for.
///
/// The bytes are written to a temporary file next to `target` and moved into
/// place, so an existing file at `target` is either fully replaced or left
/// untouched. A missing `.docx` extension is added.
///
/// # Arguments
/// * `audit` - Recorder for the `DOCUMENT_SAVE` entry.
/// * `output_dir` - Directory holding generated documents.
/// * `document_id` - Id returned by generation, `<krd_id>_<uuid>`.
/// * `target` - Path chosen by the operator.
///
/// # Returns
/// - `Ok(PathBuf)` with the final path, extension included.
/// - `Err(EngineError::DocumentNotFound)` if the document was already saved.
/// - `Err(EngineError::Io)` if the target cannot be written; the generated
///   file is kept so the operator can retry.
pub fn save_document(
    audit: &dyn AuditRecorder,
    output_dir: &Path,
    document_id: &str,
    target: &Path,
) -> Result<PathBuf, EngineError> {
    let document = locate(output_dir, document_id)?;
    let source = document.path;
    let target = with_docx_extension(target)?;
    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let bytes = fs::read(&source)?;
    let mut staged = NamedTempFile::new_in(directory)?;
    staged.write_all(&bytes)?;
    staged.flush()?;
    staged.persist(&target).map_err(|e| EngineError::Io(e.error))?;

    if let Err(e) = fs::remove_file(&source) {
        warn!("Could not remove generated file {}: {}", source.display(), e);
    }

    info!("Saved document {} to {}", document_id, target.display());
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    audit.record(AuditEntry::document_saved(Some(document.krd_id), &file_name));
    Ok(target)
}

fn with_docx_extension(target: &Path) -> Result<PathBuf, EngineError> {
    if target.file_name().is_none() {
        return Err(EngineError::InvalidInput(format!(
            "'{}' is not a file path",
            target.display()
        )));
    }
    let is_docx = target
        .extension()
        .map(|e| e.eq_ignore_ascii_case("docx"))
        .unwrap_or(false);
    if is_docx {
        Ok(target.to_path_buf())
    } else {
        let mut name = target.as_os_str().to_owned();
        name.push(".docx");
        Ok(PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, MemoryAuditRecorder};
    use uuid::Uuid;

    fn generated(output_dir: &Path, bytes: &[u8]) -> String {
        let id = format!("7_{}", Uuid::new_v4());
        fs::write(output_dir.join(format!("{}.docx", id)), bytes).unwrap();
        id
    }

    #[test]
    fn saves_copy_and_clears_output() {
        let output = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let id = generated(output.path(), b"PK-doc");
        let audit = MemoryAuditRecorder::default();

        let saved = save_document(&audit, output.path(), &id, &target_dir.path().join("Ответ")).unwrap();

        assert_eq!(saved, target_dir.path().join("Ответ.docx"));
        assert_eq!(fs::read(&saved).unwrap(), b"PK-doc");
        assert!(matches!(
            locate(output.path(), &id),
            Err(EngineError::DocumentNotFound(_))
        ));
        assert_eq!(audit.actions(), vec![AuditAction::DocumentSave]);
        let entry = &audit.entries()[0];
        assert_eq!(entry.krd_id, Some(7));
        assert_eq!(entry.description, "Saved document \"Ответ.docx\" for KRD-7");
    }

    #[test]
    fn overwrites_existing_target() {
        let output = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let target = target_dir.path().join("letter.DOCX");
        fs::write(&target, b"old").unwrap();
        let id = generated(output.path(), b"new");

        let saved = save_document(&MemoryAuditRecorder::default(), output.path(), &id, &target).unwrap();
        assert_eq!(saved, target);
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn missing_directory_keeps_generated_file() {
        let output = tempfile::tempdir().unwrap();
        let id = generated(output.path(), b"doc");
        let target = output.path().join("no/such/dir/out.docx");

        let result = save_document(&MemoryAuditRecorder::default(), output.path(), &id, &target);
        assert!(matches!(result, Err(EngineError::Io(_))));
        assert!(locate(output.path(), &id).is_ok());
    }

    #[test]
    fn unknown_document_is_not_found() {
        let output = tempfile::tempdir().unwrap();
        let result = save_document(
            &MemoryAuditRecorder::default(),
            output.path(),
            &format!("3_{}", Uuid::new_v4()),
            &output.path().join("x.docx"),
        );
        assert!(matches!(result, Err(EngineError::DocumentNotFound(_))));
    }
}
