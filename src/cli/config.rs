// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management using the `config` crate for hierarchical discovery and merging.
//!
//! ## Configuration Sources (in precedence order, highest to lowest):
//! 1. **CLI flags** - Highest precedence, applied in [`merge_config`]
//! 2. **Environment variables** - `RULESYNC_*` prefix with `__` between
//!    sections, e.g. `RULESYNC_GENERAL__TARGETS=cursor,claudecode`
//! 3. **Config files** - Lowest precedence
//!
//! ## Config File Discovery (in merge order, later overrides earlier):
//! 1. `~/.config/rulesync/config.toml` (user config directory)
//! 2. `rulesync.toml` in the git repository root of the project
//! 3. `rulesync.toml` in the project directory
//! 4. Explicit `--config` path (if provided and exists)
//!
//! ## Example `rulesync.toml`:
//! ```toml
//! [general]
//! targets = ["claudecode", "cursor", "copilot"]
//!
//! [generate]
//! delete = true
//! backup = false
//! ```

use crate::MergedConfig;
use crate::adapters::ToolTarget;
use crate::cli::args::{Args, Command, DEFAULT_CONFIG_FILE};
use crate::utils::error::RulesyncError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from config files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Tool ids to generate; `"*"` or empty means every tool
    #[serde(default)]
    pub targets: Vec<String>,
    /// Project root, relative to the working directory
    pub base_dir: Option<PathBuf>,
}

/// Defaults for `rulesync generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub backup: bool,
}

/// What the invocation does, after merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Generate {
        targets: Vec<ToolTarget>,
        delete: bool,
    },
    Import {
        from: ToolTarget,
        force: bool,
    },
    Init,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Generate { .. } => "generate",
            Action::Import { .. } => "import",
            Action::Init => "init",
        }
    }
}

fn discover_config_paths(project_dir: &Path, explicit_path: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // User config (lowest precedence)
    if let Some(user_config) = get_user_config_path() {
        paths.push(user_config);
    }

    let project_config = project_dir.join(DEFAULT_CONFIG_FILE);

    // Git root config
    if let Some(git_root) = find_git_root(project_dir) {
        let git_config = git_root.join(DEFAULT_CONFIG_FILE);
        if git_config.exists() && git_config != project_config {
            paths.push(git_config);
        }
    }

    // Project directory config
    if project_config.exists() {
        paths.push(project_config);
    }

    // Explicit --config path (highest precedence)
    if explicit_path != Path::new(DEFAULT_CONFIG_FILE) && explicit_path.exists() {
        paths.push(explicit_path.to_path_buf());
    }

    paths
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    git2::Repository::discover(start)
        .ok()
        .and_then(|repo| repo.workdir().map(|p| p.to_path_buf()))
}

fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|config_dir| config_dir.join("rulesync").join("config.toml"))
        .filter(|path| path.exists())
}

/// Load configuration from discovered config files and environment variables.
pub fn load(args: &Args) -> Result<Config> {
    let project_dir = args.base_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut builder = config::Config::builder();

    for config_path in discover_config_paths(&project_dir, &args.config) {
        tracing::debug!("Loading config from {}", config_path.display());
        builder = builder.add_source(config::File::from(config_path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("RULESYNC")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("general.targets")
            .try_parsing(true),
    );

    let settings = builder
        .build()
        .map_err(|e| RulesyncError::Config(format!("Failed to build configuration: {}", e)))?;

    let config = settings.try_deserialize().map_err(|e| {
        RulesyncError::Config(format!("Failed to deserialize configuration: {}", e))
    })?;
    Ok(config)
}

/// Resolve targets from the config file. Empty or `"*"` selects every tool.
fn config_targets(config: &GeneralConfig) -> Result<Vec<ToolTarget>, RulesyncError> {
    if config.targets.is_empty() || config.targets.iter().any(|t| t.trim() == "*") {
        return Ok(ToolTarget::ALL.to_vec());
    }
    config
        .targets
        .iter()
        .map(|t| t.parse::<ToolTarget>().map_err(|_| RulesyncError::invalid_target(t)))
        .collect()
}

/// Merge CLI arguments over the loaded configuration.
///
/// Flags win when given; boolean flags can only switch a setting on.
pub fn merge_config(args: &Args, config: Config) -> Result<MergedConfig, RulesyncError> {
    let base_dir = args
        .base_dir
        .clone()
        .or(config.general.base_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let (action, backup, dry_run) = match &args.command {
        Command::Generate(generate) => {
            let mut targets = if generate.targets.is_empty() {
                config_targets(&config.general)?
            } else {
                generate.targets.clone()
            };
            let mut seen = std::collections::BTreeSet::new();
            targets.retain(|t| seen.insert(*t));
            (
                Action::Generate {
                    targets,
                    delete: generate.delete || config.generate.delete,
                },
                generate.backup || config.generate.backup,
                generate.dry_run,
            )
        }
        Command::Import(import) => (
            Action::Import {
                from: import.from,
                force: import.force,
            },
            import.backup,
            import.dry_run,
        ),
        Command::Init => (Action::Init, false, false),
    };

    Ok(MergedConfig {
        base_dir,
        action,
        backup,
        dry_run,
        json: args.json,
        verbose: args.verbose,
        quiet: args.quiet,
    })
}
