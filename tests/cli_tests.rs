//! CLI integration tests for postboard-server
//!
//! Runs the built binary against temporary directories to exercise the init
//! and config commands.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SECRET_ENV: &str = "POSTBOARD_CLI_TEST_SECRET";

/// Runs postboard-server with arguments inside `working_dir`.
fn run_postboard(args: &[&str], working_dir: &Path, secret: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_postboard-server"));
    cmd.args(args)
        .arg("--no-color")
        .current_dir(working_dir)
        .env_remove(SECRET_ENV);

    if let Some(secret) = secret {
        cmd.env(SECRET_ENV, secret);
    }

    cmd.output().expect("Failed to execute command")
}

fn write_config(dir: &Path) {
    let config = format!(
        r#"
[server]
host = "127.0.0.1"
port = 4000

[auth]
jwt_secret_env = "{SECRET_ENV}"

[database]
url = "./data/test.db"
"#
    );
    fs::write(dir.join("postboard.toml"), config).expect("Failed to write config");
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_help_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_postboard(&["--help"], temp_dir.path(), None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("init"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_version_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_postboard(&["--version"], temp_dir.path(), None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("postboard-server"));
}

// =============================================================================
// Init Command
// =============================================================================

#[test]
fn test_init_scaffolds_deployment() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_postboard(&["init", "--port", "8080"], temp_dir.path(), None);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(temp_dir.path().join("data").is_dir());
    assert!(temp_dir.path().join(".env.example").exists());
    assert!(temp_dir.path().join(".gitignore").exists());

    let config = fs::read_to_string(temp_dir.path().join("postboard.toml"))
        .expect("postboard.toml should exist");
    assert!(config.contains("8080"));
}

#[test]
fn test_init_fails_without_force_when_exists() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(temp_dir.path());

    let output = run_postboard(&["init"], temp_dir.path(), None);
    assert!(!output.status.success());

    let config = fs::read_to_string(temp_dir.path().join("postboard.toml")).unwrap();
    assert!(config.contains(SECRET_ENV));
}

#[test]
fn test_init_with_force_overwrites() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(temp_dir.path());

    let output = run_postboard(&["init", "--force"], temp_dir.path(), None);
    assert!(output.status.success());

    let config = fs::read_to_string(temp_dir.path().join("postboard.toml")).unwrap();
    assert!(!config.contains(SECRET_ENV));
}

#[test]
fn test_init_keeps_existing_gitignore() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join(".gitignore"), "custom\n").unwrap();

    let output = run_postboard(&["init"], temp_dir.path(), None);
    assert!(output.status.success());

    let gitignore = fs::read_to_string(temp_dir.path().join(".gitignore")).unwrap();
    assert_eq!(gitignore, "custom\n");
}

// =============================================================================
// Config Command
// =============================================================================

#[test]
fn test_config_command_hides_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(temp_dir.path());
    let secret = "a-cli-test-secret-that-is-long-enough-1234";

    let output = run_postboard(&["config", "--validate"], temp_dir.path(), Some(secret));

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4000"));
    assert!(stdout.contains("<set>"));
    assert!(!stdout.contains(secret));
}

#[test]
fn test_config_validate_rejects_weak_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(temp_dir.path());

    let output = run_postboard(&["config", "--validate"], temp_dir.path(), Some("short"));
    assert!(!output.status.success());
}

#[test]
fn test_config_validate_missing_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(temp_dir.path());

    let output = run_postboard(&["config", "--validate"], temp_dir.path(), None);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<missing>"));
}

#[test]
fn test_config_command_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run_postboard(&["config"], temp_dir.path(), None);
    assert!(!output.status.success());
}

#[test]
fn test_serve_refuses_to_start_without_secret() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(temp_dir.path());

    let output = run_postboard(&[], temp_dir.path(), None);
    assert!(!output.status.success());
}
