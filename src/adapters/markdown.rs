// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Adapter for tools whose rule files are plain Markdown without frontmatter.
//!
//! Most agents read a single root memory file (`CLAUDE.md`, `AGENTS.md`, ...)
//! plus a directory of auxiliary documents the root file points at. Others
//! just read every file of one directory. Both shapes differ only in their
//! [`RuleLayout`], so one adapter serves them all.

use serde_yaml::Mapping;
use std::path::Path;

use super::{RuleAdapter, RuleLayout, RuleLocation, ToolRule, ToolTarget, plain_to_canonical};
use crate::rules::CanonicalRule;
use crate::rules::reference::ReferenceDialect;
use crate::utils::error::RulesyncError;

/// Frontmatter-less Markdown adapter parameterized by layout and dialect.
#[derive(Debug, Clone)]
pub struct MarkdownAdapter {
    target: ToolTarget,
    layout: RuleLayout,
    dialect: Option<ReferenceDialect>,
}

impl MarkdownAdapter {
    pub const fn new(
        target: ToolTarget,
        layout: RuleLayout,
        dialect: Option<ReferenceDialect>,
    ) -> Self {
        Self {
            target,
            layout,
            dialect,
        }
    }

    const fn memories(
        target: ToolTarget,
        root_file: &'static str,
        rules_dir: &'static str,
        dialect: ReferenceDialect,
    ) -> Self {
        Self::new(
            target,
            RuleLayout {
                root_file: Some(root_file),
                rules_dir,
                file_suffix: ".md",
                legacy_files: &[],
            },
            Some(dialect),
        )
    }

    const fn directory(
        target: ToolTarget,
        rules_dir: &'static str,
        legacy_files: &'static [&'static str],
    ) -> Self {
        Self::new(
            target,
            RuleLayout {
                root_file: None,
                rules_dir,
                file_suffix: ".md",
                legacy_files,
            },
            None,
        )
    }

    pub const fn agentsmd() -> Self {
        Self::memories(
            ToolTarget::Agentsmd,
            "AGENTS.md",
            ".agents/memories",
            ReferenceDialect::Structured,
        )
    }

    pub const fn augmentcode_legacy() -> Self {
        Self::memories(
            ToolTarget::AugmentcodeLegacy,
            ".augment-guidelines",
            ".augment/rules",
            ReferenceDialect::Plain,
        )
    }

    pub const fn claudecode() -> Self {
        Self::memories(
            ToolTarget::Claudecode,
            "CLAUDE.md",
            ".claude/memories",
            ReferenceDialect::Plain,
        )
    }

    pub const fn codexcli() -> Self {
        Self::memories(
            ToolTarget::Codexcli,
            "AGENTS.md",
            ".codex/memories",
            ReferenceDialect::Structured,
        )
    }

    pub const fn geminicli() -> Self {
        Self::memories(
            ToolTarget::Geminicli,
            "GEMINI.md",
            ".gemini/memories",
            ReferenceDialect::Structured,
        )
    }

    pub const fn junie() -> Self {
        Self::memories(
            ToolTarget::Junie,
            ".junie/guidelines.md",
            ".junie/memories",
            ReferenceDialect::Plain,
        )
    }

    pub const fn opencode() -> Self {
        Self::memories(
            ToolTarget::Opencode,
            "AGENTS.md",
            ".opencode/memories",
            ReferenceDialect::Structured,
        )
    }

    pub const fn qwencode() -> Self {
        Self::memories(
            ToolTarget::Qwencode,
            "QWEN.md",
            ".qwen/memories",
            ReferenceDialect::Structured,
        )
    }

    pub const fn warp() -> Self {
        Self::memories(
            ToolTarget::Warp,
            "WARP.md",
            ".warp/memories",
            ReferenceDialect::Structured,
        )
    }

    pub const fn amazonqcli() -> Self {
        Self::directory(ToolTarget::Amazonqcli, ".amazonq/rules", &[])
    }

    pub const fn cline() -> Self {
        Self::directory(ToolTarget::Cline, ".clinerules", &[])
    }

    pub const fn roo() -> Self {
        Self::directory(ToolTarget::Roo, ".roo/rules", &[".roorules"])
    }
}

impl RuleAdapter for MarkdownAdapter {
    fn target(&self) -> ToolTarget {
        self.target
    }

    fn layout(&self) -> &RuleLayout {
        &self.layout
    }

    fn reference_dialect(&self) -> Option<ReferenceDialect> {
        self.dialect
    }

    fn from_canonical(
        &self,
        rule: &CanonicalRule,
        base_dir: &Path,
    ) -> Result<ToolRule, RulesyncError> {
        Ok(ToolRule::new(
            self.target,
            self.layout.placement(base_dir, rule),
            rule.is_root(),
            Mapping::new(),
            rule.body(),
        ))
    }

    fn from_native_file(
        &self,
        base_dir: &Path,
        relative_path: &Path,
        content: &str,
    ) -> Result<ToolRule, RulesyncError> {
        Ok(ToolRule::new(
            self.target,
            RuleLocation::from_relative(base_dir, relative_path),
            self.layout.is_root_path(relative_path),
            Mapping::new(),
            content,
        ))
    }

    fn to_canonical(&self, rule: &ToolRule) -> Result<CanonicalRule, RulesyncError> {
        Ok(plain_to_canonical(&self.layout, rule))
    }
}
