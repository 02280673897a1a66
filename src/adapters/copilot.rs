// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! GitHub Copilot custom instructions.
//!
//! The root rule becomes `.github/copilot-instructions.md`; every other rule
//! becomes `.github/instructions/<name>.instructions.md` with `description`
//! and a comma separated `applyTo` pattern.

use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::{
    RuleAdapter, RuleLayout, RuleLocation, ToolRule, ToolTarget, imported_rule, plain_to_canonical,
};
use crate::rules::CanonicalRule;
use crate::rules::classify::{ALL_FILES_GLOB, is_all_files};
use crate::rules::frontmatter;
use crate::utils::error::RulesyncError;

const LAYOUT: RuleLayout = RuleLayout {
    root_file: Some(".github/copilot-instructions.md"),
    rules_dir: ".github/instructions",
    file_suffix: ".instructions.md",
    legacy_files: &[],
};

/// Copilot spells "every file" as `**`.
const COPILOT_ALL_FILES: &str = "**";

#[derive(Debug, Clone, Default)]
pub struct CopilotAdapter;

impl RuleAdapter for CopilotAdapter {
    fn target(&self) -> ToolTarget {
        ToolTarget::Copilot
    }

    fn layout(&self) -> &RuleLayout {
        &LAYOUT
    }

    fn from_canonical(
        &self,
        rule: &CanonicalRule,
        base_dir: &Path,
    ) -> Result<ToolRule, RulesyncError> {
        let mut mapping = Mapping::new();
        if !rule.is_root() {
            if !rule.description().is_empty() {
                mapping.insert(
                    "description".into(),
                    Value::String(rule.description().to_string()),
                );
            }
            let apply_to = if is_all_files(rule.globs()) {
                COPILOT_ALL_FILES.to_string()
            } else {
                rule.globs().join(",")
            };
            if !apply_to.is_empty() {
                mapping.insert("applyTo".into(), Value::String(apply_to));
            }
        }

        Ok(ToolRule::new(
            ToolTarget::Copilot,
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
        let location = RuleLocation::from_relative(base_dir, relative_path);
        if LAYOUT.is_root_path(relative_path) {
            return Ok(ToolRule::new(
                ToolTarget::Copilot,
                location,
                true,
                Mapping::new(),
                content,
            ));
        }

        let (mapping, body) = frontmatter::parse_document(relative_path, content)?;
        frontmatter::get_string(relative_path, &mapping, "description")?;
        frontmatter::get_globs(relative_path, &mapping, "applyTo")?;
        Ok(ToolRule::new(
            ToolTarget::Copilot,
            location,
            false,
            mapping,
            body,
        ))
    }

    fn to_canonical(&self, rule: &ToolRule) -> Result<CanonicalRule, RulesyncError> {
        if rule.is_root() {
            return Ok(plain_to_canonical(&LAYOUT, rule));
        }

        let path = rule.relative_path();
        let description = frontmatter::get_string(&path, rule.frontmatter(), "description")?
            .unwrap_or_default();
        let globs = frontmatter::get_globs(&path, rule.frontmatter(), "applyTo")?
            .into_iter()
            .map(|g| {
                if g == COPILOT_ALL_FILES {
                    ALL_FILES_GLOB.to_string()
                } else {
                    g
                }
            })
            .collect();

        Ok(imported_rule(&LAYOUT, rule, description, globs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleFrontmatter, RuleTargets};
    use std::path::PathBuf;

    fn canonical(root: bool, description: &str, globs: &[&str]) -> CanonicalRule {
        CanonicalRule::new(
            "typescript.md",
            RuleFrontmatter {
                root,
                targets: RuleTargets::All,
                description: description.to_string(),
                globs: globs.iter().map(|g| g.to_string()).collect(),
                tags: None,
            },
            "Prefer interfaces.",
        )
    }

    #[test]
    fn test_non_root_instruction_file() {
        let tool = CopilotAdapter
            .from_canonical(&canonical(false, "TS rules", &["**/*.ts", "**/*.tsx"]), Path::new("/r"))
            .unwrap();
        assert_eq!(
            tool.relative_path(),
            PathBuf::from(".github/instructions/typescript.instructions.md")
        );
        let back = CopilotAdapter.to_canonical(&tool).unwrap();
        assert_eq!(back.description(), "TS rules");
        assert_eq!(back.globs(), ["**/*.ts", "**/*.tsx"]);
        assert_eq!(back.relative_file(), Path::new("typescript.md"));
    }

    #[test]
    fn test_root_has_no_frontmatter() {
        let tool = CopilotAdapter
            .from_canonical(&canonical(true, "Overview", &["**/*"]), Path::new("/r"))
            .unwrap();
        assert_eq!(tool.relative_path(), PathBuf::from(".github/copilot-instructions.md"));
        assert_eq!(tool.content().unwrap(), "Prefer interfaces.\n");
    }

    #[test]
    fn test_all_files_maps_to_double_star() {
        let tool = CopilotAdapter
            .from_canonical(&canonical(false, "", &["**/*"]), Path::new("/r"))
            .unwrap();
        assert_eq!(
            tool.frontmatter().get("applyTo"),
            Some(&Value::String("**".to_string()))
        );
        let back = CopilotAdapter.to_canonical(&tool).unwrap();
        assert_eq!(back.globs(), ["**/*"]);
    }

    #[test]
    fn test_import_root_file() {
        let rule = CopilotAdapter
            .from_native_file(
                Path::new("/r"),
                Path::new(".github/copilot-instructions.md"),
                "# Repo\n",
            )
            .unwrap();
        let canonical = CopilotAdapter.to_canonical(&rule).unwrap();
        assert!(canonical.is_root());
        assert_eq!(canonical.relative_file(), Path::new("overview.md"));
    }

    #[test]
    fn test_import_instruction_with_bare_apply_to() {
        let rule = CopilotAdapter
            .from_native_file(
                Path::new("/r"),
                Path::new(".github/instructions/py.instructions.md"),
                "---\napplyTo: \"**/*.py\"\n---\nUse type hints.",
            )
            .unwrap();
        let canonical = CopilotAdapter.to_canonical(&rule).unwrap();
        assert_eq!(canonical.globs(), ["**/*.py"]);
        assert_eq!(canonical.relative_file(), Path::new("py.md"));
        assert_eq!(canonical.body(), "Use type hints.");
    }
}
