mod structural;

use crate::section::Sections;

/// Options controlling how markup lines are classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Lines whose trimmed text starts with this marker are dropped.
    /// An empty marker disables comments.
    pub comment_marker: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            comment_marker: "//".to_string(),
        }
    }
}

/// Parser entry point.
pub struct Parser {
    source: String,
    options: ParserOptions,
}

impl Parser {
    pub fn new(source: impl Into<String>) -> Self {
        Parser {
            source: source.into(),
            options: ParserOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the source text into its sections. Every input parses; there is
    /// no malformed markup.
    pub fn parse(&self) -> Sections {
        structural::parse_sections(&self.source, &self.options)
    }
}

/// Parse `source` with default options.
pub fn parse(source: &str) -> Sections {
    structural::parse_sections(source, &ParserOptions::default())
}
