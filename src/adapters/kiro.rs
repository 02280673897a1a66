// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Kiro steering documents (`.kiro/steering/*.md`).

use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::{RuleAdapter, RuleLayout, RuleLocation, ToolRule, ToolTarget, imported_rule};
use crate::rules::CanonicalRule;
use crate::rules::classify::RuleMode;
use crate::rules::frontmatter;
use crate::utils::error::RulesyncError;

const LAYOUT: RuleLayout = RuleLayout {
    root_file: None,
    rules_dir: ".kiro/steering",
    file_suffix: ".md",
    legacy_files: &[],
};

#[derive(Debug, Clone, Default)]
pub struct KiroAdapter;

impl KiroAdapter {
    /// Steering files without `inclusion` are always included.
    fn mode_of(path: &Path, mapping: &Mapping) -> Result<(RuleMode, Vec<String>), RulesyncError> {
        let patterns = frontmatter::get_globs(path, mapping, "fileMatchPattern")?;
        let mode = match frontmatter::get_string(path, mapping, "inclusion")?.as_deref() {
            None | Some("always") => RuleMode::Always,
            Some("fileMatch") => RuleMode::SpecificFiles,
            Some("manual") => RuleMode::Manual,
            Some(other) => {
                return Err(RulesyncError::invalid_field(
                    path,
                    "inclusion",
                    format!("unknown inclusion '{}'", other),
                ));
            }
        };
        Ok((mode, patterns))
    }
}

impl RuleAdapter for KiroAdapter {
    fn target(&self) -> ToolTarget {
        ToolTarget::Kiro
    }

    fn layout(&self) -> &RuleLayout {
        &LAYOUT
    }

    fn from_canonical(
        &self,
        rule: &CanonicalRule,
        base_dir: &Path,
    ) -> Result<ToolRule, RulesyncError> {
        let mode = RuleMode::for_canonical(rule.is_root(), rule.description(), rule.globs());
        let mut mapping = Mapping::new();
        match mode {
            RuleMode::Always => {
                mapping.insert("inclusion".into(), Value::String("always".to_string()));
            }
            RuleMode::SpecificFiles => {
                mapping.insert("inclusion".into(), Value::String("fileMatch".to_string()));
                mapping.insert(
                    "fileMatchPattern".into(),
                    Value::String(rule.globs().join(",")),
                );
            }
            RuleMode::Manual | RuleMode::Intelligently => {
                mapping.insert("inclusion".into(), Value::String("manual".to_string()));
            }
        }

        Ok(ToolRule::new(
            ToolTarget::Kiro,
            LAYOUT.placement(base_dir, rule),
            rule.is_root(),
            mapping,
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
        Self::mode_of(relative_path, &mapping)?;
        Ok(ToolRule::new(
            ToolTarget::Kiro,
            RuleLocation::from_relative(base_dir, relative_path),
            false,
            mapping,
            body,
        ))
    }

    fn to_canonical(&self, rule: &ToolRule) -> Result<CanonicalRule, RulesyncError> {
        let (mode, patterns) = Self::mode_of(&rule.relative_path(), rule.frontmatter())?;
        let normalized = mode.normalize("", &patterns);
        Ok(imported_rule(
            &LAYOUT,
            rule,
            normalized.description,
            normalized.globs,
        ))
    }
}
