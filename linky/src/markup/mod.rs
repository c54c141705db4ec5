//! Link and paragraph scanning over section bodies.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// `[Name]` or `<Name>`, whichever starts first. The two forms never nest.
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]|<([^>]+)>").expect("link pattern is valid"));

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));

/// How a link reference expands when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `[Name]`: appends the target as a new block beneath the paragraph, once.
    Fold,
    /// `<Name>`: replaces the link with the target's text in place.
    Inline,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Fold => write!(f, "fold"),
            LinkKind::Inline => write!(f, "inline"),
        }
    }
}

/// A run of section text: either literal text or a link reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Link {
        kind: LinkKind,
        /// Text between the delimiters, as written.
        label: &'a str,
    },
}

impl Segment<'_> {
    /// Section name a link refers to: its label, trimmed.
    pub fn target(&self) -> Option<&str> {
        match self {
            Segment::Link { label, .. } => Some(label.trim()),
            Segment::Text(_) => None,
        }
    }
}

/// Split a section body into paragraphs on blank-line runs.
pub fn paragraphs(body: &str) -> Vec<&str> {
    PARAGRAPH_BREAK.split(body).collect()
}

/// Scan `text` left to right into literal runs and link references.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in LINK.captures_iter(text) {
        let (kind, label) = match (caps.get(1), caps.get(2)) {
            (Some(m), _) => (LinkKind::Fold, m.as_str()),
            (None, Some(m)) => (LinkKind::Inline, m.as_str()),
            (None, None) => continue,
        };
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Text(&text[last..whole.start()]));
        }

        log::trace!("{} link '{}' at {}", kind, label, whole.start());
        segments.push(Segment::Link { kind, label });

        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_mixed_links() {
        let segments = scan("a [b] c <d> e");
        assert_eq!(
            segments,
            vec![
                Segment::Text("a "),
                Segment::Link { kind: LinkKind::Fold, label: "b" },
                Segment::Text(" c "),
                Segment::Link { kind: LinkKind::Inline, label: "d" },
                Segment::Text(" e"),
            ]
        );
    }

    #[test]
    fn first_opening_delimiter_wins() {
        // The bracket opens first, so the angle inside is part of its label.
        let segments = scan("[a <b> c]");
        assert_eq!(
            segments,
            vec![Segment::Link { kind: LinkKind::Fold, label: "a <b> c" }]
        );
    }

    #[test]
    fn empty_delimiters_are_text() {
        assert_eq!(scan("[] and <>"), vec![Segment::Text("[] and <>")]);
    }

    #[test]
    fn target_is_trimmed_label() {
        let segments = scan("[ padded ]");
        assert_eq!(segments[0].target(), Some("padded"));
    }

    #[test]
    fn paragraph_split_on_blank_runs() {
        assert_eq!(paragraphs("a\nb\n\nc\n \n\nd"), vec!["a\nb", "c", "d"]);
        assert_eq!(paragraphs(""), vec![""]);
    }
}
