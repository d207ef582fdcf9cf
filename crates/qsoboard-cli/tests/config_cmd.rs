use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_defaults_to_working_directory() {
    cargo_bin_cmd!("qsoboard")
        .env_remove("QSOBOARD_CONFIG")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qsoboard.toml"));
}

#[test]
fn test_config_path_honors_env() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("kiosk.toml");

    cargo_bin_cmd!("qsoboard")
        .env("QSOBOARD_CONFIG", &config_path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kiosk.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("qsoboard.toml");

    cargo_bin_cmd!("qsoboard")
        .arg("--config")
        .arg(&config_path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("event_name"));
    assert!(contents.contains("[modes]"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("qsoboard.toml");
    fs::write(&config_path, "# existing config").unwrap();

    cargo_bin_cmd!("qsoboard")
        .arg("--config")
        .arg(&config_path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("qsoboard.toml");
    fs::write(&config_path, "[timing]\ntick_ms = 0\n").unwrap();

    cargo_bin_cmd!("qsoboard")
        .arg("--config")
        .arg(&config_path)
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("timing.tick_ms must be greater than zero"));
}
