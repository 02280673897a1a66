// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! # rulesync
//!
//! rulesync keeps AI coding assistant rules in one canonical directory,
//! `.rulesync/rules/*.md`, and converts them to and from the native files of
//! each supported tool (Claude Code, Cursor, Copilot, Windsurf, ...).
//!
//! ## Architecture
//!
//! - [`rules`] - the canonical rule model, frontmatter handling, mode
//!   classification and the reference section generator
//! - [`adapters`] - one [`adapters::RuleAdapter`] per tool, looked up through
//!   the [`adapters::AdapterRegistry`]
//! - [`processor`] - the per-target batch: load, convert, merge, write
//! - [`output`] - writing files with backups and dry-run support
//! - [`cli`] - argument parsing and layered configuration
//!
//! Configuration follows hierarchical precedence:
//! 1. User config (~/.config/rulesync/config.toml)
//! 2. Git root (rulesync.toml)
//! 3. Project directory (rulesync.toml)
//! 4. Explicit --config path
//! 5. Environment variables (RULESYNC_*)
//! 6. CLI flags (highest precedence)
//!
//! The `MergedConfig` struct represents the final resolved configuration after
//! merging all sources.

pub mod adapters;
pub mod cli;
pub mod output;
pub mod processor;
pub mod rules;
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use adapters::{AdapterRegistry, ToolTarget};
use cli::config::Action;
use output::writer::{self, OutputFile, WriteOptions};
use processor::{RULESYNC_LABEL, RuleProcessor};
use rules::{CanonicalRule, RULESYNC_RULES_DIR, RuleFrontmatter, RuleTargets};
use utils::diagnostics::{DiagnosticSink, TracingSink};
use utils::error::RulesyncError;
use utils::summary::{BatchReport, TargetReport, display_batch_summary};

/// Final resolved configuration after merging all sources (CLI, env, config files).
#[derive(Debug, Clone)]
pub struct MergedConfig {
    /// Project root holding `.rulesync/rules`
    pub base_dir: PathBuf,
    /// Subcommand with its resolved options
    pub action: Action,
    /// Keep `.bak` copies of replaced files
    pub backup: bool,
    /// Report without writing
    pub dry_run: bool,
    /// Print the batch report as JSON
    pub json: bool,
    /// Verbosity level (0-2)
    pub verbose: u8,
    /// Quiet mode (suppress the summary)
    pub quiet: bool,
}

impl MergedConfig {
    fn write_options(&self) -> WriteOptions {
        WriteOptions::new(&self.base_dir)
            .with_backups(self.backup)
            .with_dry_run(self.dry_run)
    }
}

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::WARN
    } else {
        match verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));

    // A second initialization (e.g. in tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run one invocation and print its summary.
pub async fn run(config: MergedConfig) -> Result<()> {
    tracing::info!("rulesync v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Configuration: base_dir={}, action={:?}, backup={}, dry_run={}",
        config.base_dir.display(),
        config.action,
        config.backup,
        config.dry_run
    );

    let started = Instant::now();
    let report = execute(&config, Arc::new(TracingSink)).await?;

    if config.json {
        console::Term::stdout().write_line(&report.to_json()?)?;
    } else {
        display_batch_summary(&report, started.elapsed(), config.quiet)?;
    }
    Ok(())
}

/// Run one invocation, reporting diagnostics to `sink`.
pub async fn execute(config: &MergedConfig, sink: Arc<dyn DiagnosticSink>) -> Result<BatchReport> {
    if !config.base_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Project directory does not exist: {}",
            config.base_dir.display()
        ))
        .context("Failed to validate --base-dir");
    }

    let registry = AdapterRegistry::builtin();
    match &config.action {
        Action::Generate { targets, delete } => {
            generate(config, &registry, sink, targets, *delete).await
        }
        Action::Import { from, force } => import(config, &registry, sink, *from, *force).await,
        Action::Init => init(config),
    }
}

async fn generate(
    config: &MergedConfig,
    registry: &AdapterRegistry,
    sink: Arc<dyn DiagnosticSink>,
    targets: &[ToolTarget],
    delete: bool,
) -> Result<BatchReport> {
    let mut report = BatchReport::new("generate", config.dry_run);

    // Every processor is built before anything is loaded.
    let mut processors = targets
        .iter()
        .map(|&target| RuleProcessor::new(&config.base_dir, target, registry, Arc::clone(&sink)))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = processors.first_mut() else {
        tracing::warn!("No targets selected, nothing to generate");
        return Ok(report);
    };
    let outcome = first.load_rulesync_files().await;
    report.loaded = outcome.loaded();
    report.skipped = outcome.skipped.clone();

    if outcome.all_failed() {
        return Err(RulesyncError::NoValidRules {
            dir: config.base_dir.join(RULESYNC_RULES_DIR),
            skipped: outcome.skipped.len(),
        }
        .into());
    }
    if outcome.items.is_empty() {
        tracing::warn!(
            "No rules found in {}; run `rulesync init` to create one",
            config.base_dir.join(RULESYNC_RULES_DIR).display()
        );
        return Ok(report);
    }

    let mut converted = Vec::with_capacity(processors.len());
    for processor in &mut processors {
        let tools = processor
            .convert_rulesync_files_to_tool_files(&outcome.items)
            .with_context(|| format!("Failed to convert rules for {}", processor.target()))?;
        converted.push(tools);
    }

    let options = config.write_options();
    let mut deleted = Vec::with_capacity(processors.len());
    for processor in &processors {
        let paths = if delete {
            let existing = processor.existing_tool_files().await;
            writer::remove_files(&existing, &options)?
        } else {
            Vec::new()
        };
        deleted.push(paths);
    }

    for ((processor, tools), deleted) in processors.iter_mut().zip(converted).zip(deleted) {
        let written = processor
            .write_tool_files(&tools, &options)
            .with_context(|| format!("Failed to write {} rules", processor.target()))?;
        report.targets.push(TargetReport {
            target: processor.target().to_string(),
            converted: tools.len(),
            written,
            deleted,
        });
    }

    Ok(report)
}

async fn import(
    config: &MergedConfig,
    registry: &AdapterRegistry,
    sink: Arc<dyn DiagnosticSink>,
    from: ToolTarget,
    force: bool,
) -> Result<BatchReport> {
    let mut report = BatchReport::new("import", config.dry_run);
    let mut processor = RuleProcessor::new(&config.base_dir, from, registry, sink)?;

    let outcome = processor
        .load_tool_files()
        .await
        .with_context(|| format!("Failed to load {} rules", from))?;
    report.loaded = outcome.loaded();
    report.skipped = outcome.skipped.clone();

    if outcome.all_failed() {
        let layout = registry.get(from)?.layout().clone();
        return Err(RulesyncError::NoValidRules {
            dir: config.base_dir.join(layout.rules_dir),
            skipped: outcome.skipped.len(),
        }
        .into());
    }
    if outcome.items.is_empty() {
        tracing::warn!("No {} rules found in {}", from, config.base_dir.display());
        return Ok(report);
    }

    let rules = processor.convert_tool_files_to_rulesync_files(&outcome.items)?;
    let written = processor.write_rulesync_files(&rules, &config.write_options().with_force(force))?;
    report.targets.push(TargetReport {
        target: RULESYNC_LABEL.to_string(),
        converted: rules.len(),
        written,
        deleted: Vec::new(),
    });
    Ok(report)
}

/// Body of the sample rule written by `rulesync init`.
const SAMPLE_OVERVIEW: &str = "# Project Overview

Describe the project, its architecture and the conventions every AI assistant
should follow here. This file is the root rule: it is always applied and the
other rules in this directory are listed next to it.

## Coding Guidelines

- Follow the existing code style
- Write tests for new functionality
";

fn init(config: &MergedConfig) -> Result<BatchReport> {
    let mut report = BatchReport::new("init", config.dry_run);
    let rule = CanonicalRule::new(
        adapters::ROOT_CANONICAL_FILE,
        RuleFrontmatter {
            root: true,
            targets: RuleTargets::All,
            description: "Project overview and general development guidelines".to_string(),
            globs: vec![rules::classify::ALL_FILES_GLOB.to_string()],
            tags: None,
        },
        SAMPLE_OVERVIEW,
    );

    if config.base_dir.join(rule.relative_path()).exists() {
        tracing::info!(
            "{} already exists, leaving it untouched",
            rule.relative_path().display()
        );
        return Ok(report);
    }

    let file = OutputFile {
        label: RULESYNC_LABEL.to_string(),
        relative_path: rule.relative_path(),
        content: rule.to_file_content()?,
    };
    let written = writer::write_output(&[file], &config.write_options())?;
    report.targets.push(TargetReport {
        target: RULESYNC_LABEL.to_string(),
        converted: 1,
        written,
        deleted: Vec::new(),
    });
    Ok(report)
}
