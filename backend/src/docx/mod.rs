//! # Word Document Package Handling
//!
//! Reading and rewriting of `.docx` packages: a ZIP archive whose text lives
//! in WordprocessingML parts (main document, headers, footers).
//!
//! ## Sub-modules:
//! - `xml`: an owned XML tree that round-trips a part through `quick-xml`.
//! - `package`: locates the text-bearing parts and rebuilds the archive.
//! - `paragraph`: paragraph text assembly and the single-run paragraph rewrite.
//! - `extract`: collects the distinct `{{name}}` tokens of a template.
//! - `render`: substitutes resolved values into a copy of a template.

mod extract;
mod package;
mod paragraph;
mod render;
mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extract::extract_placeholders;
pub use render::render;

/// Failures while opening, parsing or rebuilding a document package.
#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    #[error("not a valid document package: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("document part '{0}' is missing")]
    MissingPart(String),

    #[error("document part '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("i/o error while processing package: {0}")]
    Io(#[from] std::io::Error),
}
