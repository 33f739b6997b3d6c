use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Metadata of an uploaded document template.
///
/// The binary payload is never part of this struct: it is fetched on demand
/// from the template repository when placeholders are extracted or a
/// document is generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}
