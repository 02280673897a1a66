// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Application mode inference for dialects without an explicit mode field.
//!
//! Cursor style frontmatter only carries `description`, `globs` and
//! `alwaysApply`. The mode is derived from those three signals, first match
//! wins:
//!
//! | alwaysApply | description | globs | mode            |
//! |-------------|-------------|-------|-----------------|
//! | true        | any         | any   | `always`        |
//! | false/unset | empty       | empty | `manual`        |
//! | false/unset | any         | set   | `specificFiles` |
//! | false/unset | set         | empty | `intelligently` |
//!
//! Normalization then shapes the canonical fields for the mode: `always`
//! forces `["**/*"]`, `specificFiles` drops the description and
//! `intelligently` clears the globs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Glob list meaning "every file".
pub const ALL_FILES_GLOB: &str = "**/*";

/// How a rule is attached to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleMode {
    /// Always loaded.
    Always,
    /// Only loaded when explicitly referenced.
    Manual,
    /// Attached when a file matching the globs is in context.
    SpecificFiles,
    /// The agent decides from the description.
    Intelligently,
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Manual => write!(f, "manual"),
            Self::SpecificFiles => write!(f, "specificFiles"),
            Self::Intelligently => write!(f, "intelligently"),
        }
    }
}

/// The raw signals read from a native document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSignals {
    pub description: String,
    pub globs: Vec<String>,
    pub always_apply: Option<bool>,
}

/// A classified rule with its canonical description and globs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mode: RuleMode,
    pub description: String,
    pub globs: Vec<String>,
}

/// Infer the mode from the three signals.
pub fn classify_mode(description: &str, globs: &[String], always_apply: Option<bool>) -> RuleMode {
    let has_description = !description.trim().is_empty();
    let has_globs = globs.iter().any(|g| !g.trim().is_empty());

    if always_apply == Some(true) {
        return RuleMode::Always;
    }

    match (has_description, has_globs) {
        (false, false) => RuleMode::Manual,
        (_, true) => RuleMode::SpecificFiles,
        (true, false) => RuleMode::Intelligently,
    }
}

impl RuleMode {
    /// Shape description and globs the way this mode stores them canonically.
    pub fn normalize(self, description: &str, globs: &[String]) -> Classification {
        let (description, globs) = match self {
            RuleMode::Always => (description.to_string(), vec![ALL_FILES_GLOB.to_string()]),
            RuleMode::Manual => (String::new(), Vec::new()),
            RuleMode::SpecificFiles => (String::new(), globs.to_vec()),
            RuleMode::Intelligently => (description.to_string(), Vec::new()),
        };
        Classification {
            mode: self,
            description,
            globs,
        }
    }

    /// Mode implied by canonical fields when exporting to a mode-bearing
    /// dialect. Root rules and the all-files glob are always applied.
    pub fn for_canonical(root: bool, description: &str, globs: &[String]) -> Self {
        if root || is_all_files(globs) {
            return RuleMode::Always;
        }
        classify_mode(description, globs, None)
    }
}

/// Run the full decision table on a set of signals.
pub fn classify(signals: &ModeSignals) -> Classification {
    classify_mode(&signals.description, &signals.globs, signals.always_apply)
        .normalize(&signals.description, &signals.globs)
}

/// True when the glob list is exactly the all-files pattern.
pub fn is_all_files(globs: &[String]) -> bool {
    matches!(globs, [only] if only.trim() == ALL_FILES_GLOB)
}
