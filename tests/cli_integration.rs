//! CLI integration tests
//!
//! These run the built binary against throwaway project directories. None of
//! them needs Docker: the workflow paths exercised here stop before any
//! container tool is invoked.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the redock binary
fn redock_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_redock"))
}

/// Runs redock against `project` with a clean redock environment
fn redock(project: &Path, args: &[&str]) -> Output {
    Command::new(redock_bin())
        .arg("--project")
        .arg(project)
        .args(args)
        .env_remove("SKIP_DOCKER_REBUILD")
        .env_remove("RUST_LOG")
        .env_remove("REDOCK_LOG_LEVEL")
        .env_remove("REDOCK_LOG_FILE")
        .output()
        .expect("Failed to execute redock")
}

/// Helper to create a project directory that looks like a git checkout
fn create_project(dir: &TempDir) -> PathBuf {
    let root = dir.path().to_path_buf();
    fs::create_dir_all(root.join(".git/hooks")).expect("Failed to create hooks directory");
    fs::write(
        root.join("docker-compose.yml"),
        "services:\n  db:\n    image: postgres:16\n",
    )
    .expect("Failed to write compose file");
    root
}

#[test]
fn test_cli_help() {
    let output = Command::new(redock_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute redock");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("redock"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("classify"));
    assert!(stdout.contains("install-hook"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(redock_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute redock");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_requires_subcommand() {
    let output = Command::new(redock_bin())
        .output()
        .expect("Failed to execute redock");

    assert!(!output.status.success());
}

#[test]
fn test_classify_json_with_default_patterns() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);

    let output = redock(
        &project,
        &[
            "classify",
            "--format",
            "json",
            "frontend/src/App.tsx",
            "backend/src/main/java/App.java",
            "README.md",
        ],
    );

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("classify output is JSON");
    assert_eq!(report["rebuild"], true);
    assert_eq!(report["source"], "arguments");
    assert_eq!(report["files"][0]["category"], "skip");
    assert_eq!(report["files"][1]["category"], "rebuild");
    assert_eq!(report["files"][2]["category"], "skip");
}

#[test]
fn test_classify_frontend_only_exits_zero() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);

    let output = redock(&project, &["classify", "frontend/app.js", "docs.md"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Decision: no rebuild needed"));
}

#[test]
fn test_classify_with_cli_patterns() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);

    let output = redock(
        &project,
        &[
            "--rebuild-pattern",
            "frontend/**",
            "classify",
            "--format",
            "yaml",
            "frontend/app.js",
        ],
    );

    assert!(output.status.success());
    let report: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rebuild"], serde_yaml::Value::Bool(true));
}

#[test]
fn test_config_file_patterns_are_used() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);
    fs::write(
        project.join("redock.toml"),
        "[patterns]\nrebuild = [\"services/api/**\"]\n",
    )
    .unwrap();

    let output = redock(&project, &["classify", "--format", "json", "backend/App.java"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rebuild"], false);
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);
    fs::write(project.join("redock.toml"), "compose_file = [1, 2]\n").unwrap();

    let output = redock(&project, &["classify", "README.md"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("redock.toml"));
}

#[test]
fn test_install_and_uninstall_hook() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);
    let hook = project.join(".git/hooks/post-merge");

    let output = redock(&project, &["install-hook"]);
    assert!(output.status.success());
    let content = fs::read_to_string(&hook).expect("hook written");
    assert!(content.starts_with("#!/bin/sh"));
    assert!(content.contains("run --post-merge"));

    // Not a terminal, so an existing hook is only replaced with --yes
    let output = redock(&project, &["install-hook"]);
    assert_eq!(output.status.code(), Some(1));
    let output = redock(&project, &["install-hook", "--yes"]);
    assert!(output.status.success());

    let output = redock(&project, &["uninstall-hook"]);
    assert!(output.status.success());
    assert!(!hook.exists());

    let output = redock(&project, &["uninstall-hook"]);
    assert!(output.status.success());
}

#[test]
fn test_install_hook_outside_git_repository() {
    let dir = TempDir::new().unwrap();

    let output = redock(dir.path(), &["install-hook"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Git hooks directory not found"));
}

#[test]
fn test_run_with_skip_env_spawns_nothing() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);

    let output = Command::new(redock_bin())
        .arg("--project")
        .arg(&project)
        .args(["run", "--force"])
        .env("SKIP_DOCKER_REBUILD", "1")
        .env("PATH", "")
        .env_remove("REDOCK_LOG_FILE")
        .output()
        .expect("Failed to execute redock");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SKIP_DOCKER_REBUILD=1 is set"));
    assert!(project.join("redock.log").is_file());
}

/// Runs a workflow command with the skip switch set and no tools on PATH
fn redock_skipped(project: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    Command::new(redock_bin())
        .arg("--project")
        .arg(project)
        .args(args)
        .env("SKIP_DOCKER_REBUILD", "1")
        .env("PATH", "")
        .env_remove("REDOCK_LOG_FILE")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to execute redock")
}

#[test]
fn test_skip_env_wins_over_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);
    fs::write(project.join("redock.toml"), "unknown = 1\n").unwrap();

    for args in [&["run", "--post-merge"][..], &["stop"][..]] {
        let output = redock_skipped(&project, args, &[]);

        assert_eq!(output.status.code(), Some(0), "args: {:?}", args);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("SKIP_DOCKER_REBUILD=1 is set"));
    }
}

#[test]
fn test_skip_env_wins_over_bad_env_value() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);

    let output = redock_skipped(&project, &["run"], &[("REDOCK_HEALTH_TIMEOUT", "soon")]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SKIP_DOCKER_REBUILD=1 is set"));
}

#[test]
fn test_bad_config_still_fails_classify_with_skip_env() {
    let dir = TempDir::new().unwrap();
    let project = create_project(&dir);
    fs::write(project.join("redock.toml"), "unknown = 1\n").unwrap();

    let output = redock_skipped(&project, &["classify", "README.md"], &[]);

    assert_eq!(output.status.code(), Some(1));
}
