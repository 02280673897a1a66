// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Augment Code workspace rules (`.augment/rules/*.md`).
//!
//! Augment has no file patterns. A rule is either always applied, picked by
//! the agent from its description, or attached manually.

use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::{RuleAdapter, RuleLayout, RuleLocation, ToolRule, ToolTarget, imported_rule};
use crate::rules::CanonicalRule;
use crate::rules::classify::{RuleMode, classify_mode};
use crate::rules::frontmatter;
use crate::utils::error::RulesyncError;

const LAYOUT: RuleLayout = RuleLayout {
    root_file: None,
    rules_dir: ".augment/rules",
    file_suffix: ".md",
    legacy_files: &[],
};

const ALWAYS_APPLY: &str = "always_apply";
const AGENT_REQUESTED: &str = "agent_requested";
const MANUAL: &str = "manual";

#[derive(Debug, Clone, Default)]
pub struct AugmentCodeAdapter;

impl AugmentCodeAdapter {
    fn mode_of(path: &Path, mapping: &Mapping) -> Result<(RuleMode, String), RulesyncError> {
        let description =
            frontmatter::get_string(path, mapping, "description")?.unwrap_or_default();
        let mode = match frontmatter::get_string(path, mapping, "type")?.as_deref() {
            Some(ALWAYS_APPLY) => RuleMode::Always,
            Some(AGENT_REQUESTED) => RuleMode::Intelligently,
            Some(MANUAL) => RuleMode::Manual,
            Some(other) => {
                return Err(RulesyncError::invalid_field(
                    path,
                    "type",
                    format!(
                        "expected one of {}, {}, {}; got '{}'",
                        ALWAYS_APPLY, AGENT_REQUESTED, MANUAL, other
                    ),
                ));
            }
            None => classify_mode(&description, &[], None),
        };
        Ok((mode, description))
    }
}

impl RuleAdapter for AugmentCodeAdapter {
    fn target(&self) -> ToolTarget {
        ToolTarget::Augmentcode
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
        let rule_type = if mode == RuleMode::Always {
            ALWAYS_APPLY
        } else if !rule.description().is_empty() {
            AGENT_REQUESTED
        } else {
            MANUAL
        };

        let mut mapping = Mapping::new();
        mapping.insert("type".into(), Value::String(rule_type.to_string()));
        if !rule.description().is_empty() {
            mapping.insert(
                "description".into(),
                Value::String(rule.description().to_string()),
            );
        }

        Ok(ToolRule::new(
            ToolTarget::Augmentcode,
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
            ToolTarget::Augmentcode,
            RuleLocation::from_relative(base_dir, relative_path),
            false,
            mapping,
            body,
        ))
    }

    fn to_canonical(&self, rule: &ToolRule) -> Result<CanonicalRule, RulesyncError> {
        let (mode, description) = Self::mode_of(&rule.relative_path(), rule.frontmatter())?;
        let normalized = mode.normalize(&description, &[]);
        Ok(imported_rule(
            &LAYOUT,
            rule,
            normalized.description,
            normalized.globs,
        ))
    }
}
