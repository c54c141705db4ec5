use linky::{Parser, ParserOptions};
use renderer::{Activation, Engine, LinkId, Tree};

/// Parse `source` and render it from `entry`.
pub fn open(source: &str, options: ParserOptions, entry: &str) -> Engine<Tree> {
    let sections = Parser::new(source).with_options(options).parse();
    let mut engine = Engine::new(Tree::new());
    engine.show(sections, entry);
    engine
}

/// Resolve a click argument: `#3` is a link id, anything else names the
/// target of the first link not yet activated.
pub fn resolve_click(engine: &Engine<Tree>, click: &str) -> Result<LinkId, String> {
    let click = click.trim();
    if let Some(n) = click.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
        return Ok(LinkId(n));
    }
    engine
        .find_link(click)
        .ok_or_else(|| format!("no active link to '{}'", click))
}

/// Apply clicks in order, returning each outcome.
pub fn apply_clicks(engine: &mut Engine<Tree>, clicks: &[String]) -> Result<Vec<Activation>, String> {
    let mut outcomes = Vec::with_capacity(clicks.len());
    for click in clicks {
        let id = resolve_click(engine, click)?;
        let outcome = engine.activate(id);
        log::info!("click '{}' (link {}): {}", click, id, outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_by_label_follow_unused_links() {
        let mut engine = open(
            "main: [r]\nr: again [r]",
            ParserOptions::default(),
            "main",
        );
        let clicks = vec!["r".to_string(), "r".to_string(), "#0".to_string()];
        let outcomes = apply_clicks(&mut engine, &clicks).unwrap();
        assert_eq!(
            outcomes,
            vec![Activation::Expanded, Activation::Expanded, Activation::Ignored]
        );
        assert_eq!(
            engine.surface().to_string(),
            "r\n  again r\n    again [r]\n"
        );
    }

    #[test]
    fn numeric_labels_name_sections() {
        let mut engine = open("main: see [3] or [1]\n3: three", ParserOptions::default(), "main");
        assert_eq!(resolve_click(&engine, "3"), Ok(LinkId(0)));
        assert_eq!(resolve_click(&engine, "#1"), Ok(LinkId(1)));
        assert!(resolve_click(&engine, "7").is_err());

        let outcomes = apply_clicks(&mut engine, &["3".to_string()]).unwrap();
        assert_eq!(outcomes, vec![Activation::Expanded]);
        assert_eq!(engine.surface().to_string(), "see 3 or [1]\n  three\n");
    }

    #[test]
    fn unknown_label_is_an_error() {
        let mut engine = open("main: text", ParserOptions::default(), "main");
        assert!(apply_clicks(&mut engine, &["nothing".to_string()]).is_err());
    }
}
