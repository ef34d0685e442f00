//! Usage error tests
//!
//! Spawn the binary with an isolated environment and check that bad
//! invocations fail before any request is sent.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const SETTING_VARS: &[&str] = &[
    "ACCESS_KEY_ID",
    "SECRET_ACCESS_KEY",
    "REGION",
    "BUCKET",
    "ENDPOINT_URL",
];

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_aws-s3"))
}

/// Config file path inside `dir`; the file itself may not exist
fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("config.toml")
}

fn run(args: &[&str], config: &Path, env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(binary());
    cmd.arg("--config").arg(config).args(args);
    for var in SETTING_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute aws-s3")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_missing_region_and_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["ls"], &config_path(&dir), &[]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("missing flag: region, bucket"), "stderr: {err}");
    assert!(err.contains("Usage"), "stderr: {err}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_bucket_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["--region", "us-east-1", "ls"], &config_path(&dir), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing flag: bucket"));
}

#[test]
fn test_missing_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &["--region", "us-east-1", "--bucket", "photos"],
        &config_path(&dir),
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing command"));
}

#[test]
fn test_settings_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &[],
        &config_path(&dir),
        &[("REGION", "eu-west-1"), ("BUCKET", "photos")],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(!err.contains("missing flag"), "stderr: {err}");
    assert!(err.contains("missing command"), "stderr: {err}");
}

#[test]
fn test_settings_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_path(&dir);
    std::fs::write(&config, "region = \"eu-west-1\"\nbucket = \"photos\"\n").unwrap();

    let output = run(&[], &config, &[]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(!err.contains("missing flag"), "stderr: {err}");
    assert!(err.contains("missing command"), "stderr: {err}");
}

#[test]
fn test_single_dash_long_flags() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &["-region=eu-west-1", "-bucket", "photos"],
        &config_path(&dir),
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(!err.contains("missing flag"), "stderr: {err}");
    assert!(err.contains("missing command"), "stderr: {err}");
}

#[test]
fn test_access_key_without_secret() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &["--access-key-id", "AKIDEXAMPLE", "--region", "r", "--bucket", "b", "ls"],
        &config_path(&dir),
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("-access-key-id must be used with -secret-access-key"));
}

#[test]
fn test_secret_without_access_key() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        &["--region", "r", "--bucket", "b", "ls"],
        &config_path(&dir),
        &[("SECRET_ACCESS_KEY", "secret")],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("-secret-access-key must be used with -access-key-id"));
}

#[test]
fn test_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_path(&dir);
    std::fs::write(&config, "region = [").unwrap();

    let output = run(&["ls"], &config, &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("TOML parse error"));
}

#[test]
fn test_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["frobnicate"], &config_path(&dir), &[]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_targets() {
    let dir = tempfile::tempdir().unwrap();
    for command in ["download", "upload", "rm", "read", "write"] {
        let output = run(
            &["--region", "r", "--bucket", "b", command],
            &config_path(&dir),
            &[],
        );
        assert_eq!(output.status.code(), Some(1), "command: {command}");
    }
}

#[test]
fn test_help_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["--help"], &config_path(&dir), &[]);

    assert_eq!(output.status.code(), Some(0));
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("download"));
    assert!(help.contains("ACCESS_KEY_ID"));
}

#[test]
fn test_completions_need_no_settings() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["completions", "bash"], &config_path(&dir), &[]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("aws-s3"));
}
