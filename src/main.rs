// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use rulesync::utils::error::{RulesyncError, format_error};
use rulesync::{cli, run};

#[tokio::main]
async fn main() {
    // Verbosity is needed to format errors raised before the config is merged
    let verbose = std::env::args().any(|arg| arg == "-v" || arg == "-vv");

    if let Err(e) = run_main().await {
        display_error(&e, verbose);
        std::process::exit(1);
    }
}

/// Display an error with contextual formatting.
///
/// Tries to downcast to `RulesyncError` for rich formatting, falls back to
/// anyhow's error chain display for other errors.
fn display_error(error: &anyhow::Error, verbose: bool) {
    if let Some(rulesync_error) = error.downcast_ref::<RulesyncError>() {
        eprintln!("{}", format_error(rulesync_error, verbose));
        return;
    }

    eprintln!(
        "\n{} {}",
        console::style("\u{26a0} Error:").red().bold(),
        error
    );

    let causes: Vec<_> = error.chain().skip(1).collect();
    if !causes.is_empty() {
        eprintln!("\nCaused by:");
        for (i, cause) in causes.iter().enumerate() {
            let prefix = if i == causes.len() - 1 {
                "\u{2514}\u{2500}"
            } else {
                "\u{251c}\u{2500}"
            };
            eprintln!("{} {}", prefix, cause);
        }
    }

    if verbose {
        let backtrace = error.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:\n{}", backtrace);
        }
    }
}

async fn run_main() -> Result<()> {
    let args = cli::args::parse();

    rulesync::init_logging(args.verbose, args.quiet);

    // Config files + env vars, then CLI flags on top
    let config = cli::config::load(&args)?;
    let merged_config = cli::config::merge_config(&args, config)?;

    run(merged_config).await
}
