//! End-to-end tests of the `linky` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("cases")
}

#[test]
fn render_builtin_document() {
    cargo_bin_cmd!("linky")
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "This is a [link] to another paragraph.",
        ))
        .stdout(predicate::str::contains("comment").not());
}

#[test]
fn render_file_with_clicks() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("doc.linky");
    fs::write(&file, "Open [box].\nbox: Inside <more>.\nmore: deeper").unwrap();

    cargo_bin_cmd!("linky")
        .current_dir(temp_dir.path())
        .args(["render", "doc.linky", "--click", "box", "--click", "more"])
        .assert()
        .success()
        .stdout("Open box.\n  Inside deeper.\n");
}

#[test]
fn bare_file_argument_renders() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("doc.linky");
    fs::write(&file, "Just [text].").unwrap();

    cargo_bin_cmd!("linky")
        .current_dir(temp_dir.path())
        .args(["doc.linky", "--ids"])
        .assert()
        .success()
        .stdout("Just [text]^0.\n");
}

#[test]
fn unknown_click_label_fails() {
    cargo_bin_cmd!("linky")
        .args(["render", "--click", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active link to 'nowhere'"));
}

#[test]
fn missing_file_fails() {
    cargo_bin_cmd!("linky")
        .args(["render", "does-not-exist.linky"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn sections_listing_and_json() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("doc.linky");
    fs::write(&file, "intro\n\nsecond: two\nthird: three").unwrap();
    let file = file.to_str().unwrap();

    cargo_bin_cmd!("linky")
        .args(["sections", file])
        .assert()
        .success()
        .stdout("main (line 1)\nsecond (line 3)\nthird (line 4)\n");

    cargo_bin_cmd!("linky")
        .args(["sections", "--json", file])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"second\": \"two\""));
}

#[test]
fn config_file_changes_comments_and_indent() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("linky.toml"),
        "comment_marker = \"#\"\nindent = 4\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("doc.linky"),
        "# hidden\nSee [more].\nmore: Shown",
    )
    .unwrap();

    cargo_bin_cmd!("linky")
        .current_dir(temp_dir.path())
        .args(["render", "doc.linky", "-c", "more"])
        .assert()
        .success()
        .stdout("See more.\n    Shown\n");
}

#[test]
fn share_then_render_by_id() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("store");
    let file = temp_dir.path().join("doc.linky");
    fs::write(&file, "Shared [doc].\ndoc: body").unwrap();

    let output = cargo_bin_cmd!("linky")
        .args(["share", file.to_str().unwrap(), "--store"])
        .arg(&store)
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8(output.stdout).unwrap().trim().to_string();

    let record = fs::read_to_string(store.join(format!("{}.json", id))).unwrap();
    assert!(record.contains("\"type\": \"linky\""));
    assert!(record.contains("data:text/plain;base64,"));

    cargo_bin_cmd!("linky")
        .args(["render", "--id", &id, "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout("Shared [doc].\n");
}

#[test]
fn unknown_id_falls_back_to_builtin_document() {
    let temp_dir = TempDir::new().unwrap();
    cargo_bin_cmd!("linky")
        .args(["render", "--id", "nothing-here", "--store"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("This is a [link]"));
}

#[test]
fn golden_cases_pass() {
    cargo_bin_cmd!("linky")
        .args(["--no-color", "test"])
        .arg(cases_dir())
        .assert()
        .success()
        .stderr(predicate::str::contains("test result: ok."));
}

#[test]
fn category_filter() {
    cargo_bin_cmd!("linky")
        .args(["--no-color", "test", "--category", "fold"])
        .arg(cases_dir())
        .assert()
        .success()
        .stderr(predicate::str::contains("3 passed"));
}

#[test]
fn failing_case_reports_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("bad.test.linky"),
        "---\nexpect_output = \"nope\"\n---\nactual text\n",
    )
    .unwrap();

    cargo_bin_cmd!("linky")
        .args(["--no-color", "test"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("output mismatch"));
}
