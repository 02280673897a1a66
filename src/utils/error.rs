// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::path::PathBuf;
use thiserror::Error;

use crate::adapters::ToolTarget;

#[derive(Debug, Error)]
pub enum RulesyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Invalid frontmatter in {}: field '{field}' {message}", .path.display())]
    InvalidFrontmatter {
        path: PathBuf,
        field: String,
        message: String,
    },

    #[error("Parse error in {}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported tool target: '{target}'")]
    UnsupportedTarget { target: String },

    #[error("Reference section error: {0}")]
    ReferenceSection(String),

    #[error("Output format error: {0}")]
    OutputFormat(String),

    #[error("No valid rules could be loaded from {} ({skipped} file(s) skipped)", .dir.display())]
    NoValidRules { dir: PathBuf, skipped: usize },

    #[error("Validation error: {message}\nSuggestion: {suggestion}")]
    ValidationError { message: String, suggestion: String },
}

impl RulesyncError {
    pub fn invalid_field(
        path: impl Into<PathBuf>,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        RulesyncError::InvalidFrontmatter {
            path: path.into(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RulesyncError::Parse {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn yaml(path: impl Into<PathBuf>, err: serde_yaml::Error) -> Self {
        RulesyncError::Parse {
            path: path.into(),
            message: "Failed to parse YAML frontmatter".to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn unsupported_target(target: &str) -> Self {
        RulesyncError::UnsupportedTarget {
            target: target.to_string(),
        }
    }

    pub fn invalid_target(target: &str) -> Self {
        let valid = ToolTarget::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        RulesyncError::ValidationError {
            message: format!("Invalid tool target: '{}'", target),
            suggestion: format!("Valid targets are: {}", valid),
        }
    }

    /// Whether this error only concerns one source file and the batch can
    /// continue without it.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            RulesyncError::InvalidFrontmatter { .. } | RulesyncError::Parse { .. }
        )
    }
}

/// Render an error for the terminal, with the source chain in verbose mode.
pub fn format_error(error: &RulesyncError, verbose: bool) -> String {
    let mut out = format!("\n{} {}", style("\u{26a0} Error:").red().bold(), error);

    if let RulesyncError::UnsupportedTarget { .. } = error {
        out.push_str(&format!(
            "\n\n{} run `rulesync generate --help` to list the supported targets",
            style("Hint:").yellow()
        ));
    }

    if verbose {
        let mut source = std::error::Error::source(error);
        if source.is_some() {
            out.push_str("\n\nCaused by:");
        }
        while let Some(cause) = source {
            out.push_str(&format!("\n\u{2514}\u{2500} {}", cause));
            source = std::error::Error::source(cause);
        }
    }

    out
}
