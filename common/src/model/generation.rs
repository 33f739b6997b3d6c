use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved placeholder values for one case, keyed by placeholder name.
pub type ResolutionContext = BTreeMap<String, String>;

/// Returned to the caller after a document has been generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Identifier of the generated file, used to download or save it.
    pub document_id: String,
    pub template_name: String,
    pub replacement_count: usize,
    pub size_bytes: u64,
    pub suggested_file_name: String,
}
