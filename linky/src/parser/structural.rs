use std::sync::LazyLock;

use regex::Regex;

use crate::MAIN;
use crate::parser::ParserOptions;
use crate::section::{Section, Sections};

/// `name: rest`, split at the first colon.
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?):\s*(.*)$").expect("header pattern is valid"));

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split source text into named sections.
pub fn parse_sections(source: &str, options: &ParserOptions) -> Sections {
    let mut state = ParseState::new();
    let mut offset = 0;

    for raw in source.split('\n') {
        let line_start = offset;
        let line_end = offset + raw.len();
        offset = line_end + 1;

        let line = raw.trim();
        if line.is_empty() {
            state.push_blank();
            continue;
        }
        if is_comment(line, &options.comment_marker) {
            continue;
        }

        match HEADER.captures(line) {
            Some(caps) => {
                let name = caps[1].trim();
                let rest = caps.get(2).map_or("", |m| m.as_str());
                state.open_section(name, rest, line_start..line_end);
            }
            None => state.push_line(line, line_start..line_end),
        }
    }

    state.finalize()
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState {
    sections: Sections,
    /// Name the buffer will be flushed into.
    current: String,
    /// Body lines of the current section. Empty strings mark paragraph breaks.
    buffer: Vec<String>,
    span_start: Option<usize>,
    span_end: usize,
}

impl ParseState {
    fn new() -> Self {
        ParseState {
            sections: Sections::new(),
            current: MAIN.to_string(),
            buffer: Vec::new(),
            span_start: None,
            span_end: 0,
        }
    }

    fn open_section(&mut self, name: &str, rest: &str, line: std::ops::Range<usize>) {
        self.flush();
        self.current = name.to_string();
        self.span_start = Some(line.start);
        self.span_end = line.end;
        if !rest.is_empty() {
            self.buffer.push(rest.to_string());
        }
    }

    fn push_line(&mut self, line: &str, span: std::ops::Range<usize>) {
        if self.span_start.is_none() {
            self.span_start = Some(span.start);
        }
        self.span_end = span.end;
        self.buffer.push(line.to_string());
    }

    /// A blank source line. Leading blanks and repeated blanks carry no
    /// information, so only the first blank after content is kept.
    fn push_blank(&mut self) {
        if matches!(self.buffer.last(), Some(last) if !last.is_empty()) {
            self.buffer.push(String::new());
        }
    }

    fn flush(&mut self) {
        while matches!(self.buffer.last(), Some(last) if last.is_empty()) {
            self.buffer.pop();
        }

        let start = self.span_start.take().unwrap_or(self.span_end);
        if self.buffer.is_empty() {
            return;
        }

        let body = std::mem::take(&mut self.buffer).join("\n");
        log::debug!(
            "section '{}': {} bytes of body",
            self.current,
            body.len()
        );
        let replaced = self.sections.insert(Section {
            name: self.current.clone(),
            body,
            span: start..self.span_end,
        });
        if replaced.is_some() {
            log::debug!("section '{}' redeclared, earlier body replaced", self.current);
        }
    }

    fn finalize(mut self) -> Sections {
        self.flush();
        self.sections
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_comment(line: &str, marker: &str) -> bool {
    !marker.is_empty() && line.starts_with(marker)
}
