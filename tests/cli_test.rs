//! Tests of the compiled binary.

mod common;

use common::{create_temp_dir, rulesync_bin};
use std::process::Command;

#[test]
fn test_cli_help() {
    let output = Command::new(rulesync_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("import"));
    assert!(stdout.contains("init"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(rulesync_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_init_then_generate_json() {
    let dir = create_temp_dir();
    let base = dir.path().to_string_lossy().into_owned();

    let init = Command::new(rulesync_bin())
        .args(["init", "--base-dir", &base, "-q"])
        .env_remove("RULESYNC_CONFIG")
        .output()
        .expect("Failed to execute command");
    assert!(init.status.success(), "{}", String::from_utf8_lossy(&init.stderr));
    assert!(dir.path().join(".rulesync/rules/overview.md").is_file());

    let generate = Command::new(rulesync_bin())
        .args(["generate", "--targets", "claudecode", "--base-dir", &base, "--json"])
        .env_remove("RULESYNC_CONFIG")
        .output()
        .expect("Failed to execute command");
    assert!(
        generate.status.success(),
        "{}",
        String::from_utf8_lossy(&generate.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_slice(&generate.stdout).expect("stdout is not JSON");
    assert_eq!(report["command"], "generate");
    assert_eq!(report["loaded"], 1);
    assert_eq!(report["targets"][0]["target"], "claudecode");
    assert!(dir.path().join("CLAUDE.md").is_file());
}

#[test]
fn test_cli_rejects_unknown_target() {
    let dir = create_temp_dir();
    let output = Command::new(rulesync_bin())
        .args(["generate", "--targets", "notepad"])
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("notepad"));
}

#[test]
fn test_cli_missing_base_dir_fails() {
    let output = Command::new(rulesync_bin())
        .args(["generate", "--base-dir", "/definitely/not/a/rulesync/project"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}
