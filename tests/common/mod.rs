//! Common test utilities and fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory for test fixtures.
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Creates a mock project structure for testing.
pub fn create_mock_project(dir: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = dir.path().to_path_buf();

    for (path, content) in files {
        let file_path = root.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    root
}

/// Canonical rule document with the given metadata.
pub fn canonical_rule(root: bool, description: &str, globs: &[&str], body: &str) -> String {
    let globs = globs
        .iter()
        .map(|g| format!("\"{}\"", g))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "---\nroot: {}\ntargets: [\"*\"]\ndescription: \"{}\"\nglobs: [{}]\n---\n\n{}\n",
        root, description, globs, body
    )
}

/// The two-rule project used by the reference section scenario.
pub fn scenario_files() -> Vec<(&'static str, String)> {
    vec![
        (
            ".rulesync/rules/rule-a.md",
            canonical_rule(true, "A", &[], "# Rule A\n\nAlways read me."),
        ),
        (
            ".rulesync/rules/rule-b.md",
            canonical_rule(false, "B", &["**/*.ts"], "# Rule B\n\nTypeScript only."),
        ),
    ]
}

/// Write `files` into a fresh temp project.
pub fn project_with(files: &[(&str, String)]) -> (TempDir, PathBuf) {
    let dir = create_temp_dir();
    let borrowed: Vec<(&str, &str)> = files.iter().map(|(p, c)| (*p, c.as_str())).collect();
    let root = create_mock_project(&dir, &borrowed);
    (dir, root)
}

pub fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
}

/// Path of the compiled binary.
pub fn rulesync_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rulesync"))
}
