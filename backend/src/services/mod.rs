pub mod generation;
pub mod mappings;
pub mod schema;
pub mod templates;
