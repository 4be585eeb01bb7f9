//! End-to-end runs of the `mindmap` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const PLAN: &str = r#"{
  "version": "1.0",
  "title": "Plan",
  "root": {
    "id": "root",
    "title": "Plan",
    "children": [
      {
        "id": "a",
        "title": "A",
        "customFields": {
          "size": "xl"
        },
        "children": []
      }
    ]
  }
}
"#;

const SCHEMA: &str = r#"{
  "version": "1",
  "customFields": [
    { "name": "size", "label": "Size", "type": "select", "options": ["s", "m", "l"] }
  ]
}"#;

fn mindmap(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mindmap"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_check_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("plan.json"), PLAN).unwrap();

    let out = mindmap(dir.path(), &["check", "plan.json"]);
    assert!(out.status.success());
}

#[test]
fn test_check_reports_schema_errors_as_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("plan.json"), PLAN).unwrap();
    fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();

    let out = mindmap(
        dir.path(),
        &["check", "plan.json", "--schema", "schema.json", "--output", "json"],
    );
    assert_eq!(out.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["validation"]["valid"], false);
    assert_eq!(
        report["validation"]["errors"][0]["path"],
        "root.children[0].size"
    );
}

#[test]
fn test_check_uses_configured_schema() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("plan.json"), PLAN).unwrap();
    fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
    fs::write(
        dir.path().join("mindmap.config.json"),
        r#"{"schema": "schema.json"}"#,
    )
    .unwrap();

    let out = mindmap(dir.path(), &["check", "plan.json"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("root.children[0].size"));
}

#[test]
fn test_check_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.yaml"), "version: '1'\ntitle: [\n").unwrap();

    let out = mindmap(dir.path(), &["check", "broken.yaml", "--output", "json"]);
    assert_eq!(out.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["parseErrors"][0]["severity"], "error");
}

#[test]
fn test_convert_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("plan.json"), PLAN).unwrap();

    let out = mindmap(dir.path(), &["convert", "plan.json", "plan.yaml"]);
    assert!(out.status.success());
    let out = mindmap(dir.path(), &["convert", "plan.yaml", "back.json"]);
    assert!(out.status.success());

    assert_eq!(fs::read_to_string(dir.path().join("back.json")).unwrap(), PLAN);
}

#[test]
fn test_convert_needs_output_format() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("plan.json"), PLAN).unwrap();

    let out = mindmap(dir.path(), &["convert", "plan.json", "plan.out"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--to"));
}

#[test]
fn test_format_write() {
    let dir = tempfile::tempdir().unwrap();
    let compact = r#"{"version":"1.0","title":"Plan","root":{"id":"root","title":"Plan"}}"#;
    fs::write(dir.path().join("plan.json"), compact).unwrap();

    let out = mindmap(dir.path(), &["format", "plan.json", "--write"]);
    assert!(out.status.success());

    let formatted = fs::read_to_string(dir.path().join("plan.json")).unwrap();
    assert!(formatted.contains("\n  \"root\": {"));
    assert!(formatted.contains("\"children\": []"));
}
