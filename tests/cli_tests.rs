//! CLI Integration Tests for askrag
//!
//! Runs the built binary for the commands that need no LLM: help, version,
//! init and config.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run askrag-server with arguments in `working_dir`
fn run_askrag(args: &[&str], working_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_askrag-server"))
        .args(args)
        .arg("--no-color")
        .current_dir(working_dir)
        .output()
        .expect("Failed to execute command")
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_askrag(&["--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("askrag"));
    assert!(stdout.contains("init"));
    assert!(stdout.contains("retrieve"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_askrag(&["--version"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// Init Command Tests
// =============================================================================

#[test]
fn test_init_creates_project_files() {
    let dir = TempDir::new().unwrap();
    let output = run_askrag(&["init"], dir.path());

    assert!(output.status.success());
    assert!(dir.path().join("askrag.toml").exists());
    assert!(dir.path().join(".env.example").exists());
    assert!(dir.path().join("knowledge_base.txt").exists());
}

#[test]
fn test_init_does_not_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("askrag.toml"), "# mine").unwrap();

    let output = run_askrag(&["init"], dir.path());

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("askrag.toml")).unwrap(),
        "# mine"
    );
}

// =============================================================================
// Config Command Tests
// =============================================================================

#[test]
fn test_config_validate_after_init() {
    let dir = TempDir::new().unwrap();
    assert!(run_askrag(&["init"], dir.path()).status.success());

    let output = run_askrag(&["config", "--validate"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("is valid"));
}

#[test]
fn test_config_shows_effective_values() {
    let dir = TempDir::new().unwrap();
    assert!(run_askrag(&["init"], dir.path()).status.success());

    let output = run_askrag(&["config"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[rag]"));
    assert!(stdout.contains("ASKRAG_STRATEGY"));
}

#[test]
fn test_config_validate_rejects_bad_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("askrag.toml"),
        "[llm]\nmodel = \"\"\n",
    )
    .unwrap();

    let output = run_askrag(&["config", "--validate"], dir.path());

    assert!(!output.status.success());
}

#[test]
fn test_missing_config_reports_requested_path() {
    let dir = TempDir::new().unwrap();
    // A default-named file next to it must not be picked up instead
    assert!(run_askrag(&["init"], dir.path()).status.success());

    let output = run_askrag(&["--config", "custom.toml", "config"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("custom.toml"));
    assert!(!stdout.contains("askrag.toml"));
    assert!(stderr.contains("custom.toml not found"));
}
