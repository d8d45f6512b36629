//! CLI integration tests for vantage
//!
//! Tests the vantage CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a command with an isolated configuration directory
fn vantage_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vantage").unwrap();
    cmd.env("VANTAGE_CONFIG_DIR", config_dir.path());
    cmd.env_remove("VANTAGE_API_TOKEN");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_config_list_shows_defaults() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api.base_url = http://localhost:8400"))
        .stdout(predicate::str::contains("access.revalidate_on_change = true"));
}

#[test]
fn test_config_set_then_get_round_trips() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["config", "set", "api.base_url", "https://vantage.example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set api.base_url"));

    vantage_cmd(&temp)
        .args(["config", "get", "api.base_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://vantage.example.com"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure();
}

#[test]
fn test_config_rejects_token_in_file() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["config", "set", "api.token", "secret-value"])
        .assert()
        .failure();
}

#[test]
fn test_config_reset_restores_defaults() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["config", "set", "api.timeout_secs", "5"])
        .assert()
        .success();

    vantage_cmd(&temp)
        .args(["config", "reset"])
        .assert()
        .success();

    vantage_cmd(&temp)
        .args(["config", "get", "api.timeout_secs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30"));
}

#[test]
fn test_config_path_points_into_config_dir() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_doctor_reports_missing_token() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .arg("doctor")
        .assert()
        .stdout(predicate::str::contains("API Token: Not configured"));
}

#[test]
fn test_projects_list_with_unreachable_server_reports_empty() {
    let temp = TempDir::new().unwrap();
    // Failed reloads fall back to the (empty) cached snapshot.
    vantage_cmd(&temp)
        .args(["config", "set", "api.base_url", "http://127.0.0.1:1"])
        .assert()
        .success();

    vantage_cmd(&temp)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
}

#[test]
fn test_projects_show_requires_system_name() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["projects", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SYSTEM_NAME"));
}

#[test]
fn test_create_rejects_reserved_name_before_any_network_call() {
    let temp = TempDir::new().unwrap();
    vantage_cmd(&temp)
        .args(["projects", "create", "thinkbig"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));
}
