// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Batch report and the end-of-run summary.
//!
//! A [`BatchReport`] records what one invocation loaded, skipped, wrote and
//! deleted. It is printed as a styled tree on the terminal or serialized with
//! `--json`.

use crate::output::writer::OutputResult;
use crate::processor::SkippedFile;
use crate::utils::error::RulesyncError;
use anyhow::Result;
use console::{Term, style};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Per-target part of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TargetReport {
    pub target: String,
    /// Rules converted for this target
    pub converted: usize,
    pub written: Vec<OutputResult>,
    pub deleted: Vec<PathBuf>,
}

/// Everything one invocation did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub command: String,
    pub dry_run: bool,
    /// Source rules loaded
    pub loaded: usize,
    pub skipped: Vec<SkippedFile>,
    pub targets: Vec<TargetReport>,
}

impl BatchReport {
    pub fn new(command: impl Into<String>, dry_run: bool) -> Self {
        Self {
            command: command.into(),
            dry_run,
            ..Default::default()
        }
    }

    pub fn total_written(&self) -> usize {
        self.targets.iter().map(|t| t.written.len()).sum()
    }

    pub fn total_deleted(&self) -> usize {
        self.targets.iter().map(|t| t.deleted.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, RulesyncError> {
        serde_json::to_string_pretty(self).map_err(|e| RulesyncError::OutputFormat(e.to_string()))
    }
}

/// Display the summary of a finished batch.
///
/// # Errors
///
/// Returns an error if writing to the terminal fails.
pub fn display_batch_summary(report: &BatchReport, elapsed: Duration, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }

    let mut term = Term::stdout();

    writeln!(term)?;
    let headline = if report.dry_run {
        style("Dry run, nothing was written").yellow().bold()
    } else {
        style("Rules synchronized").bold()
    };
    writeln!(term, "{} {}", style("\u{2713}").green().bold(), headline)?;

    for target in &report.targets {
        writeln!(term)?;
        writeln!(
            term,
            "{} ({} rule(s)):",
            style(&target.target).bold(),
            target.converted
        )?;
        let lines: Vec<String> = target
            .deleted
            .iter()
            .map(|p| format!("deleted {}", p.display()))
            .chain(target.written.iter().map(|r| {
                format!(
                    "{} {} ({})",
                    if r.is_new { "created" } else { "updated" },
                    r.path.display(),
                    format_size(r.bytes)
                )
            }))
            .collect();
        for (i, line) in lines.iter().enumerate() {
            writeln!(term, "{} {}", style(tree_prefix(i, lines.len())).dim(), line)?;
        }
    }

    writeln!(term)?;
    writeln!(term, "{}:", style("Statistics").bold())?;
    writeln!(
        term,
        "{} Rules loaded: {}",
        style("\u{251c}\u{2500}").dim(),
        report.loaded
    )?;
    writeln!(
        term,
        "{} Files written: {}",
        style("\u{251c}\u{2500}").dim(),
        report.total_written()
    )?;
    if report.total_deleted() > 0 {
        writeln!(
            term,
            "{} Files deleted: {}",
            style("\u{251c}\u{2500}").dim(),
            report.total_deleted()
        )?;
    }
    if !report.skipped.is_empty() {
        writeln!(
            term,
            "{} Skipped: {}",
            style("\u{251c}\u{2500}").dim(),
            style(report.skipped.len()).yellow()
        )?;
    }
    writeln!(
        term,
        "{} Time: {}",
        style("\u{2514}\u{2500}").dim(),
        format_duration(elapsed)
    )?;

    if !report.skipped.is_empty() {
        writeln!(term)?;
        writeln!(term, "{}:", style("Skipped Files").yellow().bold())?;
        for skipped in &report.skipped {
            writeln!(term, "\u{2022} {}: {}", skipped.path.display(), skipped.reason)?;
        }
    }
    writeln!(term)?;

    Ok(())
}

fn tree_prefix(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "\u{2514}\u{2500}"
    } else {
        "\u{251c}\u{2500}"
    }
}

/// Format a file size for display (e.g., "3.2 KB").
fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a duration for display (e.g., "12.3s" or "1m 23s").
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor() as u64;
        let remaining_secs = secs - (mins as f64 * 60.0);
        format!("{}m {:.1}s", mins, remaining_secs)
    } else {
        format!("{:.1}s", secs)
    }
}
