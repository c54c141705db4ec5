use std::path::{Path, PathBuf};

use serde::Deserialize;

use linky::ParserOptions;
use renderer::PaintOptions;

/// Looked up in the current directory when `--config` is not given.
pub const CONFIG_FILE: &str = "linky.toml";

/// Settings from `linky.toml`. Every field is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Lines starting with this marker are comments.
    pub comment_marker: String,

    /// Section rendering starts from.
    pub entry: String,

    /// Spaces per level of unfolded content.
    pub indent: usize,

    /// Print link ids next to links that can still be activated.
    pub show_ids: bool,

    /// Directory holding shared documents.
    pub store: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            comment_marker: ParserOptions::default().comment_marker,
            entry: linky::MAIN.to_string(),
            indent: PaintOptions::default().indent,
            show_ids: false,
            store: PathBuf::from(".linky-store"),
        }
    }
}

impl Config {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            comment_marker: self.comment_marker.clone(),
        }
    }

    pub fn paint_options(&self) -> PaintOptions {
        PaintOptions {
            indent: self.indent,
            show_ids: self.show_ids,
        }
    }
}

/// Load the explicit config file, or `linky.toml` from `dir` if present, or
/// the defaults.
pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Config, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE);
            if !candidate.is_file() {
                log::debug!("Using default config");
                return Ok(Config::default());
            }
            candidate
        }
    };

    log::debug!("Using config from: {}", path.display());
    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.entry, "main");
        assert_eq!(config.comment_marker, "//");
    }

    #[test]
    fn partial_file_overrides_some_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "indent = 4\ncomment_marker = \"#\"\n").unwrap();
        let config = load(None, dir.path()).unwrap();
        assert_eq!(config.indent, 4);
        assert_eq!(config.comment_marker, "#");
        assert_eq!(config.entry, "main");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.toml");
        std::fs::write(&path, "colour = \"red\"\n").unwrap();
        assert!(load(Some(&path), dir.path()).is_err());
    }
}
