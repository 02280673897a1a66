// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::adapters::ToolTarget;

/// Default config file name, looked up in the project and git root.
pub const DEFAULT_CONFIG_FILE: &str = "rulesync.toml";

/// CLI argument parsing with environment variable support.
///
/// `RULESYNC_CONFIG` and `RULESYNC_BASE_DIR` are overridden by their flags.
#[derive(Parser, Debug)]
#[command(name = "rulesync")]
#[command(about = "Keep AI coding assistant rules in one place and convert them for every tool")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "RULESYNC_CONFIG", global = true)]
    pub config: PathBuf,

    /// Project root holding `.rulesync/rules`
    #[arg(long, env = "RULESYNC_BASE_DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    /// Print the batch report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write tool rule files from `.rulesync/rules`
    Generate(GenerateArgs),
    /// Convert one tool's rule files into `.rulesync/rules`
    Import(ImportArgs),
    /// Create `.rulesync/rules/overview.md` if it does not exist
    Init,
}

#[derive(ClapArgs, Debug, Default)]
pub struct GenerateArgs {
    /// Tools to generate, comma-separated (default: config or every tool)
    #[arg(short, long, value_delimiter = ',')]
    pub targets: Vec<ToolTarget>,

    /// Remove the tools' existing rule files before writing
    #[arg(long)]
    pub delete: bool,

    /// Keep a `.bak` copy of every replaced file
    #[arg(long)]
    pub backup: bool,

    /// Show what would be written without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ImportArgs {
    /// Tool whose files are imported
    #[arg(long)]
    pub from: ToolTarget,

    /// Replace existing canonical rule files
    #[arg(long)]
    pub force: bool,

    /// Keep a `.bak` copy of every replaced file
    #[arg(long)]
    pub backup: bool,

    /// Show what would be written without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_generate_targets_are_comma_separated() {
        let args =
            Args::try_parse_from(["rulesync", "generate", "--targets", "cursor,claudecode", "-vv"])
                .unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Generate(generate) => assert_eq!(
                generate.targets,
                vec![ToolTarget::Cursor, ToolTarget::Claudecode]
            ),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_import_requires_known_tool() {
        assert!(Args::try_parse_from(["rulesync", "import", "--from", "notepad"]).is_err());
        let args =
            Args::try_parse_from(["rulesync", "import", "--from", "augmentcode-legacy"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Import(ImportArgs {
                from: ToolTarget::AugmentcodeLegacy,
                ..
            })
        ));
    }
}
