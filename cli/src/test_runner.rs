use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::Config;
use crate::session;

const TEST_SUFFIX: &str = ".test.linky";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Section to render from. Defaults to "main".
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Links to activate, in order: link ids (`#3`) or section names.
    #[serde(default)]
    pub clicks: Vec<String>,

    /// Expected painted output (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected section names, in document order.
    #[serde(default)]
    pub expect_sections: Option<Vec<String>>,

    /// Expected outcome of each click: expanded, unresolved, ignored or stale.
    #[serde(default)]
    pub expect_activations: Option<Vec<String>>,
}

fn default_entry() -> String {
    linky::MAIN.to_string()
}

/// Split a `.test.linky` file into its TOML config and linky source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    if !content.starts_with("---") {
        return Err("missing opening --- frontmatter delimiter".into());
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..]; // skip \n---
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path, settings: &Config) -> TestResult {
    let (description, outcome) = match std::fs::read_to_string(path) {
        Ok(content) => match parse_test_file(&content) {
            Ok((config, source)) => (
                config.description.clone(),
                check_case(&config, source, settings),
            ),
            Err(e) => (None, Err(format!("frontmatter error: {}", e))),
        },
        Err(e) => (None, Err(format!("cannot read file: {}", e))),
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: match outcome {
            Ok(()) => TestOutcome::Pass,
            Err(reason) => TestOutcome::Fail(reason),
        },
    }
}

/// Render one case and compare against its expectations.
fn check_case(config: &TestConfig, source: &str, settings: &Config) -> Result<(), String> {
    // 1. Parse and render the entry section
    let mut engine = session::open(source, settings.parser_options(), &config.entry);

    // 2. Check section names before anything is clicked
    if let Some(expected) = &config.expect_sections {
        let actual: Vec<&str> = engine.sections().names().collect();
        if actual != expected.iter().map(String::as_str).collect::<Vec<_>>() {
            return Err(format!(
                "section mismatch\n  expected: {}\n  actual:   {}",
                expected.join(", "),
                actual.join(", ")
            ));
        }
    }

    // 3. Apply clicks in order; an unresolvable click fails the case
    let outcomes = session::apply_clicks(&mut engine, &config.clicks)?;

    if let Some(expected) = &config.expect_activations {
        let actual: Vec<String> = outcomes.iter().map(|o| o.to_string()).collect();
        if &actual != expected {
            return Err(format!(
                "activation mismatch\n  expected: {}\n  actual:   {}",
                expected.join(", "),
                actual.join(", ")
            ));
        }
    }

    // 4. Compare the painted tree
    if let Some(expected) = &config.expect_output {
        let painted = engine.surface().paint(&settings.paint_options());
        let actual = painted.trim();
        let expected = expected.trim();
        if actual != expected {
            return Err(format!(
                "output mismatch\n  expected:\n{}\n  actual:\n{}",
                indent_block(expected),
                indent_block(actual)
            ));
        }
    }

    Ok(())
}

fn indent_block(text: &str) -> String {
    text.lines()
        .map(|l| format!("    | {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Discover test files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    // Run order within a category follows file name
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(TEST_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    // Categories are subfolder paths; root-level files list as "(root)"
    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

fn label_for(result: &TestResult) -> String {
    result.description.clone().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(TEST_SUFFIX).to_string())
            .unwrap_or_else(|| "?".to_string())
    })
}

/// Run all test files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String], settings: &Config) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        filter_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if path.is_dir() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", paint(header, "1", no_color));
        }

        for file in files {
            let result = run_single_test(file, settings);
            let label = label_for(&result);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), label);
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), label);
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            paint("ok", "32", no_color),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

fn filter_categories(
    all: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all;
    }

    let mut filtered = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let mut found = false;
        for (cat, files) in &all {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                filtered.insert(cat.clone(), files.clone());
                found = true;
            }
        }
        if !found {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE: &str = "---
description = \"fold once\"
clicks = [\"a\", \"#0\"]
expect_activations = [\"expanded\", \"ignored\"]
expect_output = \"\"\"
go a
  A
\"\"\"
---
go [a]
a: A
";

    #[test]
    fn frontmatter_splits_config_and_source() {
        let (config, source) = parse_test_file(CASE).unwrap();
        assert_eq!(config.description.as_deref(), Some("fold once"));
        assert_eq!(config.entry, "main");
        assert_eq!(config.clicks, vec!["a", "#0"]);
        assert_eq!(source, "go [a]\na: A\n");
    }

    #[test]
    fn case_passes() {
        let (config, source) = parse_test_file(CASE).unwrap();
        assert_eq!(check_case(&config, source, &Config::default()), Ok(()));
    }

    #[test]
    fn output_mismatch_is_reported() {
        let (mut config, source) = parse_test_file(CASE).unwrap();
        config.expect_output = Some("something else".into());
        let err = check_case(&config, source, &Config::default()).unwrap_err();
        assert!(err.contains("output mismatch"), "{}", err);
    }

    #[test]
    fn missing_frontmatter_is_an_error() {
        assert!(parse_test_file("go [a]").is_err());
    }
}
