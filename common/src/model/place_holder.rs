use serde::{Deserialize, Serialize};

/// Where a set of placeholder tokens came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Tokens were read from the template package itself.
    Document,
    /// The package could not be parsed and the built-in list was returned instead.
    Fallback { reason: String },
}

/// The distinct `{{name}}` tokens of a template, sorted lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceholderSet {
    pub tokens: Vec<String>,
    pub source: ExtractionSource,
}

impl PlaceholderSet {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ExtractionSource::Fallback { .. })
    }

    /// Placeholder names with the braces removed, in token order.
    pub fn names(&self) -> Vec<String> {
        self.tokens.iter().map(|t| placeholder_name(t)).collect()
    }
}

/// Strips `{`, `}` and whitespace from both ends of a token.
///
/// `"{{ surname }}"` and `"surname"` both yield `"surname"`.
pub fn placeholder_name(token: &str) -> String {
    token
        .trim_matches(|c: char| c == '{' || c == '}' || c.is_whitespace())
        .to_string()
}
