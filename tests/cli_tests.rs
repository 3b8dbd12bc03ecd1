//! Binary-level tests for the CLI surface

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_inspect_missing_file_fails() {
    let mut cmd = Command::cargo_bin("watermark").unwrap();
    cmd.arg("inspect")
        .arg("--input")
        .arg("/nonexistent/clip.mov")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to inspect"));
}

#[test]
fn test_export_missing_watermark_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("markx.toml");
    std::fs::write(
        &config,
        "watermark_image = \"/nonexistent/brand.png\"\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("watermark").unwrap();
    cmd.arg("export")
        .arg("--input")
        .arg("/nonexistent/clip.mov")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("watermark image"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("watermark").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("inspect"));
}
