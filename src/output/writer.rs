// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! File writing for converted rules.
//!
//! This module handles the last stage of a batch:
//! - Resolving output paths against the project root
//! - Detecting existing files that must not be replaced
//! - Creating backup files
//! - Writing or, in dry-run mode, only reporting

use crate::utils::error::RulesyncError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options for controlling output file writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Base directory for output files (usually project root)
    pub base_path: PathBuf,
    /// Whether to create backups of existing files
    pub create_backups: bool,
    /// Whether existing files may be replaced
    pub force: bool,
    /// Report what would be written without touching the disk
    pub dry_run: bool,
}

impl WriteOptions {
    /// Create new write options with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            create_backups: false,
            force: false,
            dry_run: false,
        }
    }

    /// Set whether to create backups.
    pub fn with_backups(mut self, create_backups: bool) -> Self {
        self.create_backups = create_backups;
        self
    }

    /// Set whether to force overwrite.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Tool id, or `rulesync` for canonical files
    pub label: String,
    /// Path relative to [`WriteOptions::base_path`]
    pub relative_path: PathBuf,
    pub content: String,
}

/// Result of writing an output file.
#[derive(Debug, Clone, Serialize)]
pub struct OutputResult {
    pub label: String,
    /// Path where the file was (or would be) written
    pub path: PathBuf,
    /// Path to the backup file (if created)
    pub backup_path: Option<PathBuf>,
    /// Whether the file was newly created (vs overwritten)
    pub is_new: bool,
    /// Nothing was written because of dry-run mode
    pub dry_run: bool,
    pub bytes: usize,
}

/// Write every file, refusing to replace existing ones unless forced.
///
/// Conflicts are checked before anything is written, so a refused batch
/// leaves the disk untouched.
pub fn write_output(
    files: &[OutputFile],
    options: &WriteOptions,
) -> Result<Vec<OutputResult>, RulesyncError> {
    if !options.force {
        let conflicts: Vec<String> = files
            .iter()
            .map(|f| options.base_path.join(&f.relative_path))
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .collect();
        if !conflicts.is_empty() {
            return Err(RulesyncError::OutputFormat(format!(
                "Output file already exists: {}. Use --force to overwrite.",
                conflicts.join(", ")
            )));
        }
    }

    files.iter().map(|f| write_file(f, options)).collect()
}

fn write_file(file: &OutputFile, options: &WriteOptions) -> Result<OutputResult, RulesyncError> {
    let output_path = options.base_path.join(&file.relative_path);
    let is_new = !output_path.exists();

    if options.dry_run {
        tracing::info!("[dry-run] Would write {}", output_path.display());
        return Ok(OutputResult {
            label: file.label.clone(),
            path: output_path,
            backup_path: None,
            is_new,
            dry_run: true,
            bytes: file.content.len(),
        });
    }

    let backup_path = if !is_new && options.create_backups {
        Some(create_backup(&output_path)?)
    } else {
        None
    };

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RulesyncError::OutputFormat(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    std::fs::write(&output_path, &file.content).map_err(|e| {
        RulesyncError::OutputFormat(format!("Failed to write {}: {}", output_path.display(), e))
    })?;

    tracing::info!("Wrote {} rule to {}", file.label, output_path.display());

    Ok(OutputResult {
        label: file.label.clone(),
        path: output_path,
        backup_path,
        is_new,
        dry_run: false,
        bytes: file.content.len(),
    })
}

/// Delete existing files before a regeneration. Missing files are ignored.
///
/// Returns the paths that were (or, in dry-run mode, would be) removed.
pub fn remove_files(
    relative_paths: &[PathBuf],
    options: &WriteOptions,
) -> Result<Vec<PathBuf>, RulesyncError> {
    let mut removed = Vec::new();
    for relative in relative_paths {
        let path = options.base_path.join(relative);
        if !path.is_file() {
            continue;
        }
        if options.dry_run {
            tracing::info!("[dry-run] Would delete {}", path.display());
        } else {
            if options.create_backups {
                create_backup(&path)?;
            }
            std::fs::remove_file(&path).map_err(|e| {
                RulesyncError::OutputFormat(format!("Failed to delete {}: {}", path.display(), e))
            })?;
            tracing::debug!("Deleted {}", path.display());
        }
        removed.push(path);
    }
    Ok(removed)
}

/// Create a backup of an existing file.
///
/// Returns the path to the backup file.
fn create_backup(path: &Path) -> Result<PathBuf, RulesyncError> {
    let backup_path = generate_backup_path(path);

    std::fs::copy(path, &backup_path).map_err(|e| {
        RulesyncError::OutputFormat(format!(
            "Failed to create backup of {}: {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!(
        "Created backup: {} -> {}",
        path.display(),
        backup_path.display()
    );

    Ok(backup_path)
}

/// `file.ext` -> `file.ext.bak`
fn generate_backup_path(path: &Path) -> PathBuf {
    let backup_name = format!(
        "{}.bak",
        path.file_name()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    );

    path.with_file_name(backup_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file(path: &str, content: &str) -> OutputFile {
        OutputFile {
            label: "claudecode".to_string(),
            relative_path: PathBuf::from(path),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_generate_backup_path() {
        let path = Path::new("/project/CLAUDE.md");
        assert_eq!(
            generate_backup_path(path),
            PathBuf::from("/project/CLAUDE.md.bak")
        );
    }

    #[test]
    fn test_writes_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let options = WriteOptions::new(temp_dir.path());

        let results =
            write_output(&[file(".claude/memories/db.md", "DB\n")], &options).unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].is_new);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(".claude/memories/db.md")).unwrap(),
            "DB\n"
        );
    }

    #[test]
    fn test_existing_file_requires_force() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("CLAUDE.md"), "old").unwrap();
        let files = [file("new.md", "new"), file("CLAUDE.md", "new")];

        let err = write_output(&files, &WriteOptions::new(temp_dir.path())).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(!temp_dir.path().join("new.md").exists());

        let options = WriteOptions::new(temp_dir.path())
            .with_force(true)
            .with_backups(true);
        let results = write_output(&files, &options).unwrap();
        assert!(!results[1].is_new);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("CLAUDE.md.bak")).unwrap(),
            "old"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("CLAUDE.md")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let options = WriteOptions::new(temp_dir.path()).with_dry_run(true);

        let results = write_output(&[file("AGENTS.md", "x")], &options).unwrap();
        assert!(results[0].dry_run);
        assert!(!temp_dir.path().join("AGENTS.md").exists());
    }

    #[test]
    fn test_remove_files_skips_missing() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".cursor/rules")).unwrap();
        fs::write(temp_dir.path().join(".cursor/rules/a.mdc"), "x").unwrap();

        let removed = remove_files(
            &[
                PathBuf::from(".cursor/rules/a.mdc"),
                PathBuf::from(".cursor/rules/missing.mdc"),
            ],
            &WriteOptions::new(temp_dir.path()),
        )
        .unwrap();

        assert_eq!(removed.len(), 1);
        assert!(!temp_dir.path().join(".cursor/rules/a.mdc").exists());
    }
}
