// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Canonical rule model.
//!
//! A canonical rule is one `.md` file under `.rulesync/rules/`: a YAML
//! frontmatter block (`root`, `targets`, `description`, `globs`, `tags`)
//! followed by the rule body. Rules are immutable once parsed.

pub mod classify;
pub mod frontmatter;
pub mod reference;

use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::adapters::ToolTarget;
use crate::utils::error::RulesyncError;

/// Directory holding canonical rules, relative to the project root.
pub const RULESYNC_RULES_DIR: &str = ".rulesync/rules";

/// Extension of canonical rule files.
pub const RULESYNC_EXTENSION: &str = "md";

/// Which tools a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuleTargets {
    /// `"*"`: every tool.
    #[default]
    All,
    Only(BTreeSet<ToolTarget>),
}

impl RuleTargets {
    pub fn includes(&self, target: ToolTarget) -> bool {
        match self {
            RuleTargets::All => true,
            RuleTargets::Only(set) => set.contains(&target),
        }
    }

    fn to_yaml(&self) -> Value {
        let items = match self {
            RuleTargets::All => vec![Value::String("*".to_string())],
            RuleTargets::Only(set) => set
                .iter()
                .map(|t| Value::String(t.as_str().to_string()))
                .collect(),
        };
        Value::Sequence(items)
    }
}

/// Structured metadata of a canonical rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleFrontmatter {
    pub root: bool,
    pub targets: RuleTargets,
    pub description: String,
    pub globs: Vec<String>,
    pub tags: Option<Vec<String>>,
}

impl RuleFrontmatter {
    /// Validate a parsed frontmatter mapping.
    ///
    /// Every field is optional; a present field with the wrong shape fails
    /// with an error naming it.
    pub fn from_mapping(path: &Path, mapping: &Mapping) -> Result<Self, RulesyncError> {
        let root = frontmatter::get_bool(path, mapping, "root")?.unwrap_or(false);
        let targets = match frontmatter::get_string_seq(path, mapping, "targets")? {
            None => RuleTargets::All,
            Some(raw) => parse_targets(path, &raw)?,
        };
        let description = frontmatter::get_string(path, mapping, "description")?
            .map(|d| d.trim().to_string())
            .unwrap_or_default();
        let globs = frontmatter::get_string_seq(path, mapping, "globs")?.unwrap_or_default();
        validate_globs(path, &globs)?;
        let tags = frontmatter::get_string_seq(path, mapping, "tags")?;

        Ok(Self {
            root,
            targets,
            description,
            globs,
            tags,
        })
    }

    fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        mapping.insert("root".into(), Value::Bool(self.root));
        mapping.insert("targets".into(), self.targets.to_yaml());
        mapping.insert(
            "description".into(),
            Value::String(self.description.clone()),
        );
        mapping.insert(
            "globs".into(),
            Value::Sequence(self.globs.iter().cloned().map(Value::String).collect()),
        );
        if let Some(tags) = &self.tags {
            mapping.insert(
                "tags".into(),
                Value::Sequence(tags.iter().cloned().map(Value::String).collect()),
            );
        }
        mapping
    }
}

fn parse_targets(path: &Path, raw: &[String]) -> Result<RuleTargets, RulesyncError> {
    if raw.iter().any(|t| t.trim() == "*") {
        return Ok(RuleTargets::All);
    }
    raw.iter()
        .map(|t| {
            t.parse::<ToolTarget>().map_err(|_| {
                RulesyncError::invalid_field(path, "targets", format!("unknown tool '{}'", t))
            })
        })
        .collect::<Result<BTreeSet<_>, _>>()
        .map(RuleTargets::Only)
}

fn validate_globs(path: &Path, globs: &[String]) -> Result<(), RulesyncError> {
    for glob in globs {
        globset::Glob::new(glob).map_err(|e| {
            RulesyncError::invalid_field(path, "globs", format!("invalid pattern '{}': {}", glob, e))
        })?;
    }
    Ok(())
}

/// A tool-agnostic rule document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRule {
    relative_dir: PathBuf,
    relative_file: PathBuf,
    frontmatter: RuleFrontmatter,
    body: String,
}

impl CanonicalRule {
    /// Build a rule stored under [`RULESYNC_RULES_DIR`]. The body is trimmed.
    pub fn new(
        relative_file: impl Into<PathBuf>,
        frontmatter: RuleFrontmatter,
        body: impl AsRef<str>,
    ) -> Self {
        Self {
            relative_dir: PathBuf::from(RULESYNC_RULES_DIR),
            relative_file: relative_file.into(),
            frontmatter,
            body: body.as_ref().trim().to_string(),
        }
    }

    /// Parse a canonical rule file.
    pub fn parse(relative_file: impl Into<PathBuf>, content: &str) -> Result<Self, RulesyncError> {
        let relative_file = relative_file.into();
        let display_path = Path::new(RULESYNC_RULES_DIR).join(&relative_file);
        let (mapping, body) = frontmatter::parse_document(&display_path, content)?;
        let frontmatter = RuleFrontmatter::from_mapping(&display_path, &mapping)?;
        Ok(Self::new(relative_file, frontmatter, body))
    }

    /// Serialize back to a frontmatter + body document.
    pub fn to_file_content(&self) -> Result<String, RulesyncError> {
        frontmatter::render(&self.relative_path(), &self.frontmatter.to_mapping(), &self.body)
    }

    pub fn frontmatter(&self) -> &RuleFrontmatter {
        &self.frontmatter
    }

    pub fn is_root(&self) -> bool {
        self.frontmatter.root
    }

    pub fn description(&self) -> &str {
        &self.frontmatter.description
    }

    pub fn globs(&self) -> &[String] {
        &self.frontmatter.globs
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn applies_to(&self, target: ToolTarget) -> bool {
        self.frontmatter.targets.includes(target)
    }

    pub fn relative_file(&self) -> &Path {
        &self.relative_file
    }

    /// Path relative to the project root, e.g. `.rulesync/rules/style.md`.
    pub fn relative_path(&self) -> PathBuf {
        self.relative_dir.join(&self.relative_file)
    }

    /// File name without extension, used to name tool outputs.
    pub fn stem(&self) -> String {
        self.relative_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
