pub mod field_mapping;
pub mod generation;
pub mod place_holder;
pub mod schema;
pub mod template;
