//! # Document Rendering
//!
//! Produces a filled-in copy of a template. Every paragraph of the main
//! document, table cells, headers and footers is processed on its assembled
//! text, so placeholders broken into several runs by the editor are still
//! replaced. A changed paragraph collapses into a single run formatted like
//! its first run (see `paragraph::rewrite_paragraph`).
//!
//! Placeholders without a value in the context are left as literal text: the
//! operator sees `{{name}}` in the output and knows the field is unmapped.

use super::package::DocxPackage;
use super::paragraph::{for_each_paragraph_mut, paragraph_text, rewrite_paragraph, OBJECT_MARKER};
use super::xml::XmlElement;
use super::DocxError;
use common::model::generation::ResolutionContext;
use log::debug;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `{{` + one or more characters other than braces + `}}`. A placeholder
/// never spans an inline object such as a page break or a drawing.
pub(super) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^{}\x{FFFC}]+)\}\}").expect("placeholder pattern is valid")
});

#[derive(Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub replacement_count: usize,
}

/// Replaces every resolvable placeholder of `text`.
///
/// The name inside the braces is trimmed before lookup. Returns the new text
/// and the number of replacements made.
pub fn substitute(text: &str, context: &ResolutionContext) -> (String, usize) {
    let mut count = 0;
    let replaced = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        match context.get(caps[1].trim()) {
            Some(value) => {
                count += 1;
                value.replace(OBJECT_MARKER, "")
            }
            None => caps[0].to_string(),
        }
    });
    (replaced.into_owned(), count)
}

/// Renders `template` against `context` into a new package.
///
/// The template bytes are only read. Fails when the package cannot be parsed,
/// since substituting into an undecodable document is not safe.
pub fn render(template: &[u8], context: &ResolutionContext) -> Result<RenderedDocument, DocxError> {
    let package = DocxPackage::open(template)?;
    let mut replacement_count = 0;

    let bytes = package.rewrite(|part, document| {
        let mut part_count = 0;
        for_each_paragraph_mut(document, &mut |paragraph: &mut XmlElement| {
            let original = paragraph_text(paragraph);
            if original.is_empty() {
                return;
            }
            let (text, count) = substitute(&original, context);
            part_count += count;
            if text != original {
                let style = rewrite_paragraph(paragraph, &text);
                debug!(
                    "rewrote paragraph (bold={:?}, italic={:?}, underline={:?}, font={:?}, size={:?}, color={:?})",
                    style.bold(),
                    style.italic(),
                    style.underline(),
                    style.font(),
                    style.size(),
                    style.color()
                );
            }
        });
        debug!("{}: {} replacements", part.name, part_count);
        replacement_count += part_count;
    })?;

    Ok(RenderedDocument {
        bytes,
        replacement_count,
    })
}
