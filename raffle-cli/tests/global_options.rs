//! Tests for global flags, environment variables and exit codes.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_disable_autoinit_without_database() {
    let env = TestEnv::new();
    env.command()
        .args(["--disable-autoinit", "list", "--event", "gala"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Data directory not found"));
    assert!(!env.data_dir.exists());
}

#[test]
fn test_disable_autoinit_from_environment() {
    let env = TestEnv::new();
    env.command()
        .env("RAFFLE_DISABLE_AUTOINIT", "true")
        .args(["log", "A1"])
        .assert()
        .code(3);
}

#[test]
fn test_autoinit_creates_database_on_first_use() {
    let env = TestEnv::new();
    env.command()
        .args(["list", "--event", "gala"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No eligible orders."));
    assert!(env.data_dir.exists());
}

#[test]
fn test_data_dir_from_environment() {
    let env = TestEnv::new();
    env.command_bare()
        .env("RAFFLE_DATA_DIR", &env.data_dir)
        .args(["init"])
        .assert()
        .success();
    assert!(env.data_dir.join("raffle.db").exists());
}

#[test]
fn test_missing_required_argument_is_usage_error() {
    let env = TestEnv::new();
    env.command()
        .args(["run", "--event", "gala", "--size", "3"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("--user"));
}

#[test]
fn test_blank_event_is_rejected_by_parser() {
    let env = TestEnv::new();
    env.command()
        .args(["list", "--event", "  "])
        .assert()
        .code(4);
}

#[test]
fn test_unknown_format_is_rejected() {
    let env = TestEnv::new();
    env.command()
        .args(["list", "--event", "gala", "--format", "xml"])
        .assert()
        .code(4);
}

#[test]
fn test_output_format_from_environment() {
    let env = TestEnv::new();
    env.command()
        .env("RAFFLE_OUTPUT_FORMAT", "json")
        .args(["list", "--event", "gala"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_invalid_config_file_is_config_error() {
    let env = TestEnv::new();
    std::fs::create_dir_all(&env.data_dir).unwrap();
    std::fs::write(env.data_dir.join("config.yaml"), "progress_interval: 0\n").unwrap();

    env.command()
        .args(["list", "--event", "gala"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("progress_interval"));
}

#[test]
fn test_busy_timeout_flag_accepted() {
    let env = TestEnv::new();
    env.command()
        .args(["--busy-timeout", "1", "list", "--event", "gala"])
        .assert()
        .success();
}

#[test]
fn test_help_and_version_exit_zero() {
    let env = TestEnv::new();
    env.command_bare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reject"));
    env.command_bare().arg("--version").assert().success();
}
