// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Identifiers for the supported tool targets.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::RulesyncError;

/// A tool whose native rule files rulesync can read and write.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ToolTarget {
    Agentsmd,
    Amazonqcli,
    Augmentcode,
    AugmentcodeLegacy,
    Claudecode,
    Cline,
    Codexcli,
    Copilot,
    Cursor,
    Geminicli,
    Junie,
    Kiro,
    Opencode,
    Qwencode,
    Roo,
    Warp,
    Windsurf,
}

impl ToolTarget {
    pub const ALL: [ToolTarget; 17] = [
        ToolTarget::Agentsmd,
        ToolTarget::Amazonqcli,
        ToolTarget::Augmentcode,
        ToolTarget::AugmentcodeLegacy,
        ToolTarget::Claudecode,
        ToolTarget::Cline,
        ToolTarget::Codexcli,
        ToolTarget::Copilot,
        ToolTarget::Cursor,
        ToolTarget::Geminicli,
        ToolTarget::Junie,
        ToolTarget::Kiro,
        ToolTarget::Opencode,
        ToolTarget::Qwencode,
        ToolTarget::Roo,
        ToolTarget::Warp,
        ToolTarget::Windsurf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolTarget::Agentsmd => "agentsmd",
            ToolTarget::Amazonqcli => "amazonqcli",
            ToolTarget::Augmentcode => "augmentcode",
            ToolTarget::AugmentcodeLegacy => "augmentcode-legacy",
            ToolTarget::Claudecode => "claudecode",
            ToolTarget::Cline => "cline",
            ToolTarget::Codexcli => "codexcli",
            ToolTarget::Copilot => "copilot",
            ToolTarget::Cursor => "cursor",
            ToolTarget::Geminicli => "geminicli",
            ToolTarget::Junie => "junie",
            ToolTarget::Kiro => "kiro",
            ToolTarget::Opencode => "opencode",
            ToolTarget::Qwencode => "qwencode",
            ToolTarget::Roo => "roo",
            ToolTarget::Warp => "warp",
            ToolTarget::Windsurf => "windsurf",
        }
    }
}

impl fmt::Display for ToolTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolTarget {
    type Err = RulesyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ToolTarget::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| RulesyncError::unsupported_target(wanted))
    }
}
