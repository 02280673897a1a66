// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Tool rule adapters.
//!
//! Each supported tool has one adapter that maps canonical rules to the
//! tool's native files and back. Adapters are pure: they never touch the
//! file system, the processor hands them paths and contents.

pub mod augmentcode;
pub mod copilot;
pub mod cursor;
pub mod kiro;
pub mod markdown;
pub mod registry;
pub mod target;
pub mod windsurf;

pub use registry::AdapterRegistry;
pub use target::ToolTarget;

use serde_yaml::Mapping;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::rules::classify::ALL_FILES_GLOB;
use crate::rules::frontmatter;
use crate::rules::reference::{ReferenceDialect, ReferenceEntry};
use crate::rules::{CanonicalRule, RULESYNC_EXTENSION, RuleFrontmatter, RuleTargets};
use crate::utils::error::RulesyncError;

/// Canonical file name given to imported root documents.
pub const ROOT_CANONICAL_FILE: &str = "overview.md";

/// Bidirectional mapping between canonical rules and one tool's files.
pub trait RuleAdapter: Send + Sync + fmt::Debug {
    fn target(&self) -> ToolTarget;

    /// Where this tool keeps its rule files.
    fn layout(&self) -> &RuleLayout;

    /// Dialect of the reference section injected into the root document,
    /// `None` when the tool has no such section.
    fn reference_dialect(&self) -> Option<ReferenceDialect> {
        None
    }

    /// Map a canonical rule to this tool's representation.
    fn from_canonical(
        &self,
        rule: &CanonicalRule,
        base_dir: &Path,
    ) -> Result<ToolRule, RulesyncError>;

    /// Parse an existing native file. `relative_path` is relative to `base_dir`.
    fn from_native_file(
        &self,
        base_dir: &Path,
        relative_path: &Path,
        content: &str,
    ) -> Result<ToolRule, RulesyncError>;

    /// Map a tool rule back to the canonical form.
    fn to_canonical(&self, rule: &ToolRule) -> Result<CanonicalRule, RulesyncError>;
}

/// File placement of a tool's rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLayout {
    /// Fixed location of the root document, relative to the project root.
    pub root_file: Option<&'static str>,
    /// Directory holding one file per rule.
    pub rules_dir: &'static str,
    /// Suffix appended to the canonical file stem, extension included.
    pub file_suffix: &'static str,
    /// Older single-file locations still read on import.
    pub legacy_files: &'static [&'static str],
}

impl RuleLayout {
    /// Location of a canonical rule's output.
    ///
    /// Root rules go to the fixed root document when the tool has one.
    pub fn placement(&self, base_dir: &Path, rule: &CanonicalRule) -> RuleLocation {
        match self.root_file {
            Some(root_file) if rule.is_root() => RuleLocation::from_relative(base_dir, root_file),
            _ => RuleLocation {
                base_dir: base_dir.to_path_buf(),
                relative_dir: PathBuf::from(self.rules_dir),
                relative_file: format!("{}{}", rule.stem(), self.file_suffix),
            },
        }
    }

    /// Whether a file in `rules_dir` belongs to this tool.
    pub fn is_rule_file(&self, file_name: &str) -> bool {
        file_name.len() > self.file_suffix.len() && file_name.ends_with(self.file_suffix)
    }

    /// True for the root document and for legacy single-file locations.
    pub fn is_root_path(&self, relative_path: &Path) -> bool {
        self.root_file
            .iter()
            .chain(self.legacy_files.iter())
            .any(|p| Path::new(p) == relative_path)
    }

    /// True only for legacy single-file locations.
    pub fn is_legacy_path(&self, relative_path: &Path) -> bool {
        self.legacy_files.iter().any(|p| Path::new(p) == relative_path)
    }

    fn stem<'a>(&self, file_name: &'a str) -> &'a str {
        file_name.strip_suffix(self.file_suffix).unwrap_or(file_name)
    }
}

/// Where a tool rule lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLocation {
    pub base_dir: PathBuf,
    /// Directory relative to `base_dir`; empty for top-level files.
    pub relative_dir: PathBuf,
    pub relative_file: String,
}

impl RuleLocation {
    pub fn from_relative(base_dir: &Path, relative_path: impl AsRef<Path>) -> Self {
        let relative_path = relative_path.as_ref();
        Self {
            base_dir: base_dir.to_path_buf(),
            relative_dir: relative_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            relative_file: relative_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// A rule in a tool's native shape.
///
/// Built once per batch. The only change after construction is attaching a
/// reference section, which produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRule {
    target: ToolTarget,
    location: RuleLocation,
    root: bool,
    frontmatter: Mapping,
    body: String,
    reference_section: Option<String>,
}

impl ToolRule {
    pub fn new(
        target: ToolTarget,
        location: RuleLocation,
        root: bool,
        frontmatter: Mapping,
        body: impl AsRef<str>,
    ) -> Self {
        Self {
            target,
            location,
            root,
            frontmatter,
            body: body.as_ref().trim().to_string(),
            reference_section: None,
        }
    }

    /// Return a copy whose materialized content starts with `section`.
    pub fn with_reference_section(self, section: impl Into<String>) -> Self {
        Self {
            reference_section: Some(section.into()),
            ..self
        }
    }

    pub fn target(&self) -> ToolTarget {
        self.target
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn frontmatter(&self) -> &Mapping {
        &self.frontmatter
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn reference_section(&self) -> Option<&str> {
        self.reference_section.as_deref()
    }

    pub fn relative_file(&self) -> &str {
        &self.location.relative_file
    }

    /// Path relative to the project root.
    pub fn relative_path(&self) -> PathBuf {
        self.location.relative_dir.join(&self.location.relative_file)
    }

    /// Forward-slash relative path, as written in reference sections.
    pub fn relative_path_string(&self) -> String {
        self.relative_path().to_string_lossy().replace('\\', "/")
    }

    pub fn output_path(&self) -> PathBuf {
        self.location.base_dir.join(self.relative_path())
    }

    /// The file content to write.
    pub fn content(&self) -> Result<String, RulesyncError> {
        let rendered = frontmatter::render(&self.relative_path(), &self.frontmatter, &self.body)?;
        Ok(match &self.reference_section {
            Some(section) if !section.is_empty() => format!("{}{}", section, rendered),
            _ => rendered,
        })
    }

    /// Entry describing this rule in another rule's reference section.
    pub fn reference_entry(&self, canonical: &CanonicalRule) -> ReferenceEntry {
        ReferenceEntry {
            path: self.relative_path_string(),
            description: canonical.description().to_string(),
            globs: canonical.globs().to_vec(),
        }
    }
}

/// Canonical file name for an imported tool rule.
///
/// Root and legacy documents become `overview.md`; per-rule files keep their
/// stem.
pub fn canonical_file_name(layout: &RuleLayout, rule: &ToolRule) -> String {
    if layout.is_root_path(&rule.relative_path()) {
        return ROOT_CANONICAL_FILE.to_string();
    }
    format!("{}.{}", layout.stem(rule.relative_file()), RULESYNC_EXTENSION)
}

/// Build an imported canonical rule targeting every tool.
pub fn imported_rule(
    layout: &RuleLayout,
    rule: &ToolRule,
    description: String,
    globs: Vec<String>,
) -> CanonicalRule {
    let frontmatter = RuleFrontmatter {
        root: rule.is_root(),
        targets: RuleTargets::All,
        description,
        globs,
        tags: None,
    };
    CanonicalRule::new(canonical_file_name(layout, rule), frontmatter, rule.body())
}

/// Canonical projection for dialects without frontmatter: root documents
/// apply to every file, other documents carry no metadata.
pub fn plain_to_canonical(layout: &RuleLayout, rule: &ToolRule) -> CanonicalRule {
    let globs = if rule.is_root() {
        vec![ALL_FILES_GLOB.to_string()]
    } else {
        Vec::new()
    };
    imported_rule(layout, rule, String::new(), globs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: RuleLayout = RuleLayout {
        root_file: Some("CLAUDE.md"),
        rules_dir: ".claude/memories",
        file_suffix: ".md",
        legacy_files: &[],
    };

    #[test]
    fn test_placement_of_root_and_non_root() {
        let base = Path::new("/project");
        let root = CanonicalRule::new(
            "overview.md",
            RuleFrontmatter {
                root: true,
                ..Default::default()
            },
            "x",
        );
        let other = CanonicalRule::new("style.md", RuleFrontmatter::default(), "y");

        let root_location = LAYOUT.placement(base, &root);
        assert_eq!(root_location.relative_dir, PathBuf::new());
        assert_eq!(root_location.relative_file, "CLAUDE.md");

        let other_location = LAYOUT.placement(base, &other);
        assert_eq!(other_location.relative_dir, PathBuf::from(".claude/memories"));
        assert_eq!(other_location.relative_file, "style.md");
    }

    #[test]
    fn test_rule_file_suffix_matching() {
        let copilot = RuleLayout {
            root_file: None,
            rules_dir: ".github/instructions",
            file_suffix: ".instructions.md",
            legacy_files: &[],
        };
        assert!(copilot.is_rule_file("ts.instructions.md"));
        assert!(!copilot.is_rule_file("README.md"));
        assert!(!copilot.is_rule_file(".instructions.md"));
    }

    #[test]
    fn test_tool_rule_paths() {
        let rule = ToolRule::new(
            ToolTarget::Claudecode,
            RuleLocation::from_relative(Path::new("/p"), ".claude/memories/a.md"),
            false,
            Mapping::new(),
            "body",
        );
        assert_eq!(rule.relative_path(), PathBuf::from(".claude/memories/a.md"));
        assert_eq!(rule.output_path(), PathBuf::from("/p/.claude/memories/a.md"));
        assert_eq!(rule.relative_path_string(), ".claude/memories/a.md");
    }

    #[test]
    fn test_reference_section_is_prepended_to_content() {
        let rule = ToolRule::new(
            ToolTarget::Claudecode,
            RuleLocation::from_relative(Path::new("/p"), "CLAUDE.md"),
            true,
            Mapping::new(),
            "Root body",
        );
        let merged = rule.clone().with_reference_section("REFS\n\n");
        assert_eq!(rule.content().unwrap(), "Root body\n");
        assert_eq!(merged.content().unwrap(), "REFS\n\nRoot body\n");
        assert_eq!(merged.body(), rule.body());
    }

    #[test]
    fn test_canonical_file_name() {
        let root = ToolRule::new(
            ToolTarget::Claudecode,
            RuleLocation::from_relative(Path::new("/p"), "CLAUDE.md"),
            true,
            Mapping::new(),
            "x",
        );
        let memory = ToolRule::new(
            ToolTarget::Claudecode,
            RuleLocation::from_relative(Path::new("/p"), ".claude/memories/db.md"),
            false,
            Mapping::new(),
            "x",
        );
        assert_eq!(canonical_file_name(&LAYOUT, &root), "overview.md");
        assert_eq!(canonical_file_name(&LAYOUT, &memory), "db.md");
    }
}
