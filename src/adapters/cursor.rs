// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Cursor project rules (`.cursor/rules/*.mdc`) and the legacy `.cursorrules`.
//!
//! Cursor frontmatter has no mode field. The mode is recovered from
//! `description`, `globs` and `alwaysApply` with the classification table in
//! [`crate::rules::classify`], for both the per-rule files and the legacy
//! single file.

use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::{
    RuleAdapter, RuleLayout, RuleLocation, ToolRule, ToolTarget, imported_rule, plain_to_canonical,
};
use crate::rules::CanonicalRule;
use crate::rules::classify::{ModeSignals, RuleMode, classify};
use crate::rules::frontmatter;
use crate::utils::error::RulesyncError;

const LAYOUT: RuleLayout = RuleLayout {
    root_file: None,
    rules_dir: ".cursor/rules",
    file_suffix: ".mdc",
    legacy_files: &[".cursorrules"],
};

#[derive(Debug, Clone, Default)]
pub struct CursorAdapter;

impl CursorAdapter {
    /// Read the classification signals of a Cursor document.
    pub fn signals(path: &Path, mapping: &Mapping) -> Result<ModeSignals, RulesyncError> {
        Ok(ModeSignals {
            description: frontmatter::get_string(path, mapping, "description")?
                .unwrap_or_default(),
            globs: frontmatter::get_globs(path, mapping, "globs")?,
            always_apply: frontmatter::get_bool(path, mapping, "alwaysApply")?,
        })
    }

    fn native_frontmatter(rule: &CanonicalRule) -> Mapping {
        let mode = RuleMode::for_canonical(rule.is_root(), rule.description(), rule.globs());
        let mut mapping = Mapping::new();

        if !rule.description().is_empty() {
            mapping.insert(
                "description".into(),
                Value::String(rule.description().to_string()),
            );
        }
        if mode != RuleMode::Always && !rule.globs().is_empty() {
            mapping.insert("globs".into(), Value::String(rule.globs().join(",")));
        }
        mapping.insert("alwaysApply".into(), Value::Bool(mode == RuleMode::Always));
        mapping
    }
}

impl RuleAdapter for CursorAdapter {
    fn target(&self) -> ToolTarget {
        ToolTarget::Cursor
    }

    fn layout(&self) -> &RuleLayout {
        &LAYOUT
    }

    fn from_canonical(
        &self,
        rule: &CanonicalRule,
        base_dir: &Path,
    ) -> Result<ToolRule, RulesyncError> {
        Ok(ToolRule::new(
            ToolTarget::Cursor,
            LAYOUT.placement(base_dir, rule),
            rule.is_root(),
            Self::native_frontmatter(rule),
            rule.body(),
        ))
    }

    fn from_native_file(
        &self,
        base_dir: &Path,
        relative_path: &Path,
        content: &str,
    ) -> Result<ToolRule, RulesyncError> {
        let (mapping, body) = frontmatter::parse_document(relative_path, content)?;
        // Reject unusable field shapes at load time rather than on conversion.
        Self::signals(relative_path, &mapping)?;

        Ok(ToolRule::new(
            ToolTarget::Cursor,
            RuleLocation::from_relative(base_dir, relative_path),
            LAYOUT.is_legacy_path(relative_path),
            mapping,
            body,
        ))
    }

    fn to_canonical(&self, rule: &ToolRule) -> Result<CanonicalRule, RulesyncError> {
        if rule.frontmatter().is_empty() && LAYOUT.is_legacy_path(&rule.relative_path()) {
            return Ok(plain_to_canonical(&LAYOUT, rule));
        }

        let signals = Self::signals(&rule.relative_path(), rule.frontmatter())?;
        let classified = classify(&signals);
        tracing::trace!(
            path = %rule.relative_path().display(),
            mode = %classified.mode,
            "Classified cursor rule"
        );
        Ok(imported_rule(
            &LAYOUT,
            rule,
            classified.description,
            classified.globs,
        ))
    }
}
