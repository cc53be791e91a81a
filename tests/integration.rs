// Integration tests for the repoqual CLI.
//
// These tests use assert_cmd to invoke the binary and verify exit codes,
// stdout/stderr output, and generated files. Network-dependent paths are
// exercised through the cache-driven `rescore` command only.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to build a Command for the repoqual binary with a clean environment.
fn repoqual() -> Command {
    let mut cmd = Command::cargo_bin("repoqual").expect("binary should exist");
    cmd.env_remove("GITHUB_TOKEN").env_remove("GITHUB_ORG");
    cmd
}

fn sample_batch_json() -> String {
    r#"{
  "organization": "acme",
  "fetched_at": "2024-06-01T00:00:00Z",
  "repository_count": 2,
  "repositories": [
    {
      "name": "api-server",
      "org": "acme",
      "full_name": "acme/api-server",
      "total_analyzed_prs": 10,
      "self_approved_prs": 1,
      "prs_reviewed_by_others": 8,
      "prs_with_description": 9,
      "total_commits": 100,
      "direct_pushes_to_default": 5,
      "contributors_count": 5,
      "code_types": ["Rust", "Shell"]
    },
    {
      "name": "abandoned",
      "org": "acme",
      "full_name": "acme/abandoned",
      "contributors_count": 1
    }
  ]
}"#
    .to_string()
}

#[test]
fn cli_version_flag() {
    repoqual()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("repoqual"));
}

#[test]
fn cli_help_flag() {
    repoqual()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repository quality"));
}

#[test]
fn analyze_requires_org_and_token() {
    repoqual()
        .arg("analyze")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn fetch_requires_org_and_token() {
    repoqual()
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn rescore_requires_cache_argument() {
    repoqual()
        .arg("rescore")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn languages_lists_supported_names() {
    repoqual()
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("Python"))
        .stdout(predicate::str::contains("Rust"))
        .stdout(predicate::str::contains("Terraform"));
}

#[test]
fn rescore_missing_cache_exits_with_runtime_failure() {
    repoqual()
        .args(["rescore", "--cache", "/nonexistent/batch.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cache file not found"));
}

#[test]
fn rescore_malformed_cache_degrades_to_empty_result() {
    let dir = TempDir::new().expect("temp dir should be created");
    let cache = dir.path().join("batch.json");
    fs::write(&cache, "{definitely not json").expect("cache fixture should write");

    repoqual()
        .args(["rescore", "--cache"])
        .arg(&cache)
        .args(["--output-dir"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No repositories loaded"));
}

#[test]
fn rescore_writes_all_report_formats() {
    let dir = TempDir::new().expect("temp dir should be created");
    let out = TempDir::new().expect("output temp dir should be created");
    let cache = dir.path().join("batch.json");
    fs::write(&cache, sample_batch_json()).expect("cache fixture should write");

    repoqual()
        .args(["rescore", "--cache"])
        .arg(&cache)
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ANALYSIS COMPLETE"))
        .stdout(predicate::str::contains("Repositories analyzed: 2"));

    let mut extensions: Vec<String> = fs::read_dir(out.path())
        .expect("output dir should read")
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
        })
        .collect();
    extensions.sort();
    assert_eq!(extensions, ["csv", "html", "json", "xlsx"]);
}

#[test]
fn rescore_applies_custom_config() {
    let dir = TempDir::new().expect("temp dir should be created");
    let out = TempDir::new().expect("output temp dir should be created");
    let cache = dir.path().join("batch.json");
    fs::write(&cache, sample_batch_json()).expect("cache fixture should write");

    let config = dir.path().join("scoring.toml");
    fs::write(
        &config,
        r#"
[penalties.no_prs]
penalty_percent = 80
message = "Zero reviewed pull requests"
"#,
    )
    .expect("config fixture should write");

    repoqual()
        .args(["rescore", "--cache"])
        .arg(&cache)
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success();

    let json_report = fs::read_dir(out.path())
        .expect("output dir should read")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
        .expect("json report should exist");
    let content = fs::read_to_string(json_report).expect("json report should read");

    // The no-PR repository: 100 - 80 (custom no_prs) - 10 - 10 = 0.
    assert!(content.contains("Zero reviewed pull requests"));
    assert!(content.contains("\"quality_score\": 0"));
    // The healthy repository keeps the full base score.
    assert!(content.contains("\"quality_score\": 100"));
}
