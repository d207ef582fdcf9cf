use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("qsoboard")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("db"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_db_help_shows_subcommands() {
    cargo_bin_cmd!("qsoboard")
        .args(["db", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("qsoboard")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_run_without_terminal_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("qsoboard.toml");
    std::fs::write(
        &config_path,
        format!(
            "database = {:?}\n[logging]\nfile = {:?}\n",
            dir.path().join("log.db"),
            dir.path().join("qsoboard.log"),
        ),
    )
    .unwrap();

    cargo_bin_cmd!("qsoboard")
        .arg("--config")
        .arg(&config_path)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
