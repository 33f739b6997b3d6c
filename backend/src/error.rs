//! Error type shared by every engine operation.
//!
//! Operations return `EngineError` to their caller; the HTTP handlers turn it
//! into a response through `ResponseError`, so nothing is reported through a
//! process-wide hook.

use crate::docx::DocxError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("template package could not be processed: {0}")]
    Package(#[from] DocxError),

    #[error("template {0} not found")]
    TemplateNotFound(i64),

    #[error("template {0} has no document payload")]
    EmptyTemplate(i64),

    #[error("generated document '{0}' not found")]
    DocumentNotFound(String),

    #[error("template {0} has no mapping for '{1}'")]
    MappingNotFound(i64, String),

    #[error("'{0}' is not a whitelisted table")]
    UnknownTable(String),

    #[error("no whitelisted table declares column '{0}'")]
    UnknownColumn(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::TemplateNotFound(_)
            | EngineError::DocumentNotFound(_)
            | EngineError::MappingNotFound(..)
            | EngineError::UnknownTable(_)
            | EngineError::UnknownColumn(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::Package(_) | EngineError::EmptyTemplate(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EngineError::Storage(_) | EngineError::Io(_) | EngineError::Task(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            EngineError::TemplateNotFound(3).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            EngineError::InvalidInput("name".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EngineError::Package(DocxError::MissingPart("word/document.xml".into())).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            EngineError::Storage(rusqlite::Error::QueryReturnedNoRows).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn message_keeps_underlying_storage_text() {
        let err = EngineError::Storage(rusqlite::Error::InvalidQuery);
        assert!(err.to_string().starts_with("storage error:"));
    }
}
