//! # Placeholder Extraction
//!
//! Collects the distinct `{{name}}` tokens of a template so the operator can
//! bind each one to a database column.
//!
//! Every paragraph of the main document, its tables (nested ones included),
//! and all header and footer parts is searched. Matching runs on each
//! paragraph's assembled text, so a token split across several runs of the
//! same paragraph is found, while a token spanning two paragraphs is not.
//!
//! When the package cannot be read, `extract_placeholders` does not fail: it
//! returns `FALLBACK_PLACEHOLDERS`, tagged as a fallback, so an upload problem
//! never blocks the mapping workflow. Callers that need the error use
//! `scan_placeholders`.

use super::package::DocxPackage;
use super::paragraph::{for_each_paragraph, paragraph_text};
use super::render::PLACEHOLDER;
use super::xml::XmlElement;
use super::DocxError;
use common::model::place_holder::{ExtractionSource, PlaceholderSet};
use log::{debug, warn};
use std::collections::BTreeSet;

/// Tokens offered when a template cannot be parsed.
pub const FALLBACK_PLACEHOLDERS: [&str; 16] = [
    "{{surname}}",
    "{{name}}",
    "{{patronymic}}",
    "{{birth_date}}",
    "{{birth_place_town}}",
    "{{registration_address}}",
    "{{passport_series}}",
    "{{passport_number}}",
    "{{passport_issue_date}}",
    "{{passport_issued_by}}",
    "{{recipient_fio}}",
    "{{recipient_address}}",
    "{{recipient_phone}}",
    "{{response_address}}",
    "{{contact_phone}}",
    "{{signatory_name}}",
];

/// Sorted, distinct placeholder tokens of `template`, or the fallback list.
pub fn extract_placeholders(template: &[u8]) -> PlaceholderSet {
    match scan_placeholders(template) {
        Ok(tokens) => {
            debug!("extracted {} placeholders", tokens.len());
            PlaceholderSet {
                tokens: tokens.into_iter().collect(),
                source: ExtractionSource::Document,
            }
        }
        Err(e) => {
            warn!("Placeholder extraction failed, offering the default list: {}", e);
            let mut tokens: Vec<String> = FALLBACK_PLACEHOLDERS.iter().map(|t| t.to_string()).collect();
            tokens.sort();
            PlaceholderSet {
                tokens,
                source: ExtractionSource::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}

/// Strict extraction: the parse error is returned instead of a fallback.
pub fn scan_placeholders(template: &[u8]) -> Result<BTreeSet<String>, DocxError> {
    let package = DocxPackage::open(template)?;
    let mut tokens = BTreeSet::new();

    for (_, document) in package.parts()? {
        for_each_paragraph(&document, &mut |paragraph: &XmlElement| {
            let text = paragraph_text(paragraph);
            tokens.extend(PLACEHOLDER.find_iter(&text).map(|m| m.as_str().to_string()));
        });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::fixtures::{paragraph, raw_paragraph, run, table, DocxBuilder};

    #[test]
    fn finds_tokens_in_body_tables_headers_and_footers() {
        let nested = table(&[paragraph(&["nested {{rank}}"])]);
        let bytes = DocxBuilder::new()
            .body(&paragraph(&["Dear {{surname}} {{name}}"]))
            .body(&table(&[
                paragraph(&["{{birth_date}}"]),
                format!("{}{}", paragraph(&["cell"]), nested),
            ]))
            .header(&paragraph(&["{{case_number}}"]))
            .footer(&paragraph(&["{{signatory_name}}"]))
            .build();

        let set = extract_placeholders(&bytes);
        assert_eq!(set.source, ExtractionSource::Document);
        assert_eq!(
            set.tokens,
            vec![
                "{{birth_date}}",
                "{{case_number}}",
                "{{name}}",
                "{{rank}}",
                "{{signatory_name}}",
                "{{surname}}",
            ]
        );
    }

    #[test]
    fn duplicates_collapse_and_case_is_kept() {
        let bytes = DocxBuilder::new()
            .body(&paragraph(&["{{Name}} {{name}} {{name}}"]))
            .body(&paragraph(&["{{name}}"]))
            .build();
        assert_eq!(extract_placeholders(&bytes).tokens, vec!["{{Name}}", "{{name}}"]);
    }

    #[test]
    fn token_split_across_runs_is_found() {
        let bytes = DocxBuilder::new()
            .body(&paragraph(&["{{pass", "port_", "number}}"]))
            .build();
        assert_eq!(extract_placeholders(&bytes).tokens, vec!["{{passport_number}}"]);
    }

    #[test]
    fn token_split_across_paragraphs_is_not_found() {
        let bytes = DocxBuilder::new()
            .body(&paragraph(&["{{sur"]))
            .body(&paragraph(&["name}}"]))
            .build();
        assert!(extract_placeholders(&bytes).tokens.is_empty());
    }

    #[test]
    fn grammar_rejects_empty_and_nested_braces() {
        let bytes = DocxBuilder::new()
            .body(&raw_paragraph(&run("{{}} {{a{b}} {x} {{ spaced }}")))
            .build();
        assert_eq!(extract_placeholders(&bytes).tokens, vec!["{{ spaced }}"]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let bytes = DocxBuilder::new()
            .body(&paragraph(&["{{b}} {{a}}"]))
            .footer(&paragraph(&["{{c}}"]))
            .build();
        assert_eq!(extract_placeholders(&bytes), extract_placeholders(&bytes));
    }

    #[test]
    fn malformed_package_yields_tagged_fallback() {
        let set = extract_placeholders(b"PK\x03\x04 broken");
        assert!(set.is_fallback());
        assert_eq!(set.tokens.len(), FALLBACK_PLACEHOLDERS.len());
        assert!(set.tokens.windows(2).all(|w| w[0] <= w[1]));
        assert!(set.tokens.contains(&"{{signatory_name}}".to_string()));
    }

    #[test]
    fn strict_scan_reports_the_error() {
        assert!(scan_placeholders(b"not a package").is_err());
        let broken_xml = DocxBuilder::new().body("<w:p><w:r>").build();
        assert!(matches!(scan_placeholders(&broken_xml), Err(DocxError::Xml(_))));
    }
}
