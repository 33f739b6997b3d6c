use crate::model::field_mapping::MappingDraft;
use serde::Deserialize;

/// Metadata sent as the `json` part of a multipart template upload.
#[derive(Debug, Deserialize)]
pub struct TemplateMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// JSON alternative to the multipart upload, with the package base64-encoded.
#[derive(Debug, Deserialize)]
pub struct SaveTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub data_base64: String,
}

/// Full replacement of a template's mapping table.
#[derive(Debug, Deserialize)]
pub struct SaveMappingsRequest {
    pub mappings: Vec<MappingDraft>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub krd_id: i64,
}

/// Save-as target for a generated document.
#[derive(Debug, Deserialize)]
pub struct SaveDocumentRequest {
    pub path: String,
}
