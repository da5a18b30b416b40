//! Smoke tests for the sendero CLI
//!
//! These run the real binary without a browser: argument handling, listing
//! and journey file validation.

#![allow(deprecated)] // Command::cargo_bin until assert_cmd settles its replacement
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VALID_JOURNEY: &str = r#"
name: Admin Users
base_url: http://hr.test/
credentials: { username: Admin, password: admin123 }
targets:
  username: { attribute: { tag: input, attribute: name, value: username } }
  password: { attribute: { tag: input, attribute: name, value: password } }
  login_button: { attribute: { tag: button, attribute: type, value: submit } }
  profile_menu: { class: { tag: span, class: oxd-userdropdown-tab } }
login:
  steps:
    - { action: fill, target: username, value: "${username}" }
    - { action: fill, target: password, value: "${password}" }
    - { action: click, target: login_button }
  marker: { visible: profile_menu, timeout_ms: 20000 }
body:
  - { action: click, target: { role: { role: link, name: Admin } } }
  - { action: wait_for, url_matches: { glob: "**/admin/viewSystemUsers" } }
"#;

/// Get a command for the sendero binary
fn sendero() -> Command {
    let mut cmd = Command::cargo_bin("sendero").expect("sendero binary should exist");
    cmd.env_remove("SENDERO_USERNAME")
        .env_remove("SENDERO_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn journey_file(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    sendero()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    sendero()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_no_args_shows_help() {
    sendero().assert().failure();
}

#[test]
fn test_run_help_mentions_credentials() {
    sendero()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--password"))
        .stdout(predicate::str::contains("--base-url"));
}

#[test]
fn test_json_log_format_accepted() {
    sendero()
        .args(["--log-format", "json", "-vv", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_unknown_log_format_rejected() {
    sendero()
        .args(["--log-format", "xml", "list"])
        .assert()
        .failure();
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_builtins() {
    sendero()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("admin"))
        .stdout(predicate::str::contains("pim_add_employee"));
}

// ============================================================================
// Validate
// ============================================================================

#[test]
fn test_validate_journey_file() {
    let dir = TempDir::new().unwrap();
    let path = journey_file(&dir, "admin.yaml", VALID_JOURNEY);

    sendero()
        .args(["--color", "never", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Admin Users @ http://hr.test/"))
        .stdout(predicate::str::contains("confirmed by"))
        .stderr(predicate::str::contains("is valid"));
}

#[test]
fn test_validate_json_output() {
    let dir = TempDir::new().unwrap();
    let path = journey_file(&dir, "admin.yaml", VALID_JOURNEY);

    let output = sendero()
        .args(["validate", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "Admin Users");
    assert_eq!(json["login"].as_array().unwrap().len(), 3);
    assert_eq!(json["body"].as_array().unwrap().len(), 2);
}

#[test]
fn test_validate_unknown_target() {
    let dir = TempDir::new().unwrap();
    let broken = VALID_JOURNEY.replace("target: login_button", "target: submit_button");
    let path = journey_file(&dir, "broken.yaml", &broken);

    sendero()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown target 'submit_button'"));
}

#[test]
fn test_validate_missing_file() {
    sendero()
        .args(["validate", "nowhere/journey.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot read"));
}

// ============================================================================
// Run (argument errors only; no browser)
// ============================================================================

#[test]
fn test_run_unknown_scenario() {
    sendero()
        .args(["run", "payroll"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown scenario 'payroll'"));
}

#[test]
fn test_run_rejects_bad_base_url() {
    sendero()
        .args(["run", "login", "--base-url", "hr.test"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("http(s)"));
}

#[test]
fn test_run_missing_password_for_file_journey() {
    let dir = TempDir::new().unwrap();
    let no_creds = VALID_JOURNEY.replace(
        "credentials: { username: Admin, password: admin123 }\n",
        "",
    );
    let path = journey_file(&dir, "no_creds.yaml", &no_creds);

    sendero()
        .arg("run")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SENDERO_USERNAME"));
}
