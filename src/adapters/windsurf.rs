// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Windsurf workspace rules (`.windsurf/rules/*.md`) and `.windsurfrules`.

use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::{
    RuleAdapter, RuleLayout, RuleLocation, ToolRule, ToolTarget, imported_rule, plain_to_canonical,
};
use crate::rules::CanonicalRule;
use crate::rules::classify::{RuleMode, classify_mode};
use crate::rules::frontmatter;
use crate::utils::error::RulesyncError;

const LAYOUT: RuleLayout = RuleLayout {
    root_file: None,
    rules_dir: ".windsurf/rules",
    file_suffix: ".md",
    legacy_files: &[".windsurfrules"],
};

fn trigger_for(mode: RuleMode) -> &'static str {
    match mode {
        RuleMode::Always => "always_on",
        RuleMode::Manual => "manual",
        RuleMode::SpecificFiles => "glob",
        RuleMode::Intelligently => "model_decision",
    }
}

fn mode_for(path: &Path, trigger: &str) -> Result<RuleMode, RulesyncError> {
    match trigger.trim() {
        "always_on" => Ok(RuleMode::Always),
        "manual" => Ok(RuleMode::Manual),
        "glob" => Ok(RuleMode::SpecificFiles),
        "model_decision" => Ok(RuleMode::Intelligently),
        other => Err(RulesyncError::invalid_field(
            path,
            "trigger",
            format!("unknown trigger '{}'", other),
        )),
    }
}

#[derive(Debug, Clone, Default)]
pub struct WindsurfAdapter;

impl WindsurfAdapter {
    fn mode_of(
        path: &Path,
        mapping: &Mapping,
    ) -> Result<(RuleMode, String, Vec<String>), RulesyncError> {
        let description =
            frontmatter::get_string(path, mapping, "description")?.unwrap_or_default();
        let globs = frontmatter::get_globs(path, mapping, "globs")?;
        let mode = match frontmatter::get_string(path, mapping, "trigger")? {
            Some(trigger) => mode_for(path, &trigger)?,
            None => classify_mode(&description, &globs, None),
        };
        Ok((mode, description, globs))
    }
}

impl RuleAdapter for WindsurfAdapter {
    fn target(&self) -> ToolTarget {
        ToolTarget::Windsurf
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
        mapping.insert("trigger".into(), Value::String(trigger_for(mode).to_string()));
        if !rule.description().is_empty() {
            mapping.insert(
                "description".into(),
                Value::String(rule.description().to_string()),
            );
        }
        if mode == RuleMode::SpecificFiles {
            mapping.insert("globs".into(), Value::String(rule.globs().join(",")));
        }

        Ok(ToolRule::new(
            ToolTarget::Windsurf,
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
            ToolTarget::Windsurf,
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

        let (mode, description, globs) =
            Self::mode_of(&rule.relative_path(), rule.frontmatter())?;
        let normalized = mode.normalize(&description, &globs);
        Ok(imported_rule(
            &LAYOUT,
            rule,
            normalized.description,
            normalized.globs,
        ))
    }
}
