// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Batch orchestration for one tool target.
//!
//! A [`RuleProcessor`] owns one adapter and walks a batch through
//! `Idle -> Loading -> Converting -> Merging -> Writing -> Done`. Directory
//! scans read every file with `tokio::fs` and parse them concurrently; a file
//! that fails is recorded as a [`SkippedFile`] and reported through the
//! [`DiagnosticSink`] without affecting its siblings. Single-file loads (a
//! tool's root document) propagate their errors.

use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::{AdapterRegistry, RuleAdapter, ToolRule, ToolTarget};
use crate::output::writer::{self, OutputFile, OutputResult, WriteOptions};
use crate::rules::reference::{self, ReferenceEntry};
use crate::rules::{CanonicalRule, RULESYNC_EXTENSION, RULESYNC_RULES_DIR};
use crate::utils::diagnostics::{Diagnostic, DiagnosticSink};
use crate::utils::error::RulesyncError;

/// Label used for canonical files in write results.
pub const RULESYNC_LABEL: &str = "rulesync";

/// Where a batch currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStage {
    Idle,
    Loading,
    Converting,
    Merging,
    Writing,
    Done,
}

/// A file left out of a batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Items loaded by a scan plus the files that could not be loaded.
#[derive(Debug, Clone)]
pub struct LoadOutcome<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedFile>,
}

impl<T> LoadOutcome<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn loaded(&self) -> usize {
        self.items.len()
    }

    /// True when files were found but none of them loaded.
    pub fn all_failed(&self) -> bool {
        self.items.is_empty() && !self.skipped.is_empty()
    }
}

/// Converts rules between the canonical directory and one tool.
#[derive(Debug)]
pub struct RuleProcessor {
    base_dir: PathBuf,
    target: ToolTarget,
    adapter: Arc<dyn RuleAdapter>,
    sink: Arc<dyn DiagnosticSink>,
    stage: BatchStage,
}

impl RuleProcessor {
    /// Fails with `UnsupportedTarget` when the registry has no adapter for
    /// `target`.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        target: ToolTarget,
        registry: &AdapterRegistry,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, RulesyncError> {
        let adapter = registry.get(target)?;
        Ok(Self {
            base_dir: base_dir.into(),
            target,
            adapter,
            sink,
            stage: BatchStage::Idle,
        })
    }

    pub fn target(&self) -> ToolTarget {
        self.target
    }

    pub fn stage(&self) -> BatchStage {
        self.stage
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn set_stage(&mut self, stage: BatchStage) {
        tracing::trace!(target_tool = %self.target, ?stage, "Batch stage");
        self.stage = stage;
    }

    /// Load every canonical rule of the project.
    ///
    /// A missing directory yields an empty outcome. Files that fail to parse
    /// are skipped with a warning.
    pub async fn load_rulesync_files(&mut self) -> LoadOutcome<CanonicalRule> {
        self.set_stage(BatchStage::Loading);
        let dir = self.base_dir.join(RULESYNC_RULES_DIR);
        let suffix = format!(".{}", RULESYNC_EXTENSION);
        let files = self
            .scan_dir(&dir, |name| name.len() > suffix.len() && name.ends_with(&suffix))
            .await;

        let loads = files.into_iter().map(|file_name| {
            let path = dir.join(&file_name);
            async move {
                let result = match tokio::fs::read_to_string(&path).await {
                    Ok(content) => CanonicalRule::parse(&file_name, &content),
                    Err(e) => Err(RulesyncError::from(e)),
                };
                (Path::new(RULESYNC_RULES_DIR).join(&file_name), result)
            }
        });
        let outcome = self.collect(join_all(loads).await);

        self.sink.emit(Diagnostic::debug(format!(
            "Loaded {} canonical rule(s), skipped {}",
            outcome.loaded(),
            outcome.skipped.len()
        )));
        outcome
    }

    /// Load the tool's existing native files.
    ///
    /// The root document and legacy single files are loaded one by one and
    /// their errors propagate. The per-rule directory is scanned like the
    /// canonical one.
    pub async fn load_tool_files(&mut self) -> Result<LoadOutcome<ToolRule>, RulesyncError> {
        self.set_stage(BatchStage::Loading);
        let layout = self.adapter.layout().clone();
        let mut outcome = LoadOutcome::empty();

        for single in layout.root_file.iter().chain(layout.legacy_files.iter()) {
            if let Some(rule) = self.load_single_tool_file(Path::new(single)).await? {
                outcome.items.push(rule);
            }
        }

        let rules_dir = self.base_dir.join(layout.rules_dir);
        let files = self
            .scan_dir(&rules_dir, |name| layout.is_rule_file(name))
            .await;
        let adapter = &self.adapter;
        let base_dir = &self.base_dir;
        let loads = files.into_iter().map(|file_name| {
            let relative = Path::new(layout.rules_dir).join(&file_name);
            async move {
                let result = match tokio::fs::read_to_string(base_dir.join(&relative)).await {
                    Ok(content) => adapter.from_native_file(base_dir, &relative, &content),
                    Err(e) => Err(RulesyncError::from(e)),
                };
                (relative, result)
            }
        });
        let scanned = self.collect(join_all(loads).await);
        outcome.items.extend(scanned.items);
        outcome.skipped.extend(scanned.skipped);

        self.sink.emit(Diagnostic::info(format!(
            "Loaded {} {} rule(s), skipped {}",
            outcome.loaded(),
            self.target,
            outcome.skipped.len()
        )));
        Ok(outcome)
    }

    async fn load_single_tool_file(
        &self,
        relative: &Path,
    ) -> Result<Option<ToolRule>, RulesyncError> {
        let path = self.base_dir.join(relative);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => self
                .adapter
                .from_native_file(&self.base_dir, relative, &content)
                .map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.sink
                    .emit(Diagnostic::debug("Not present").with_path(relative));
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Map canonical rules to tool rules and splice the reference section
    /// into the root document.
    pub fn convert_rulesync_files_to_tool_files(
        &mut self,
        rules: &[CanonicalRule],
    ) -> Result<Vec<ToolRule>, RulesyncError> {
        self.set_stage(BatchStage::Converting);
        let converted = rules
            .iter()
            .filter(|rule| rule.applies_to(self.target))
            .map(|rule| {
                self.adapter
                    .from_canonical(rule, &self.base_dir)
                    .map(|tool| (tool, rule))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.set_stage(BatchStage::Merging);
        self.merge_reference_section(converted)
    }

    /// Second phase of the export: pick the root, build the section from
    /// every non-root rule and replace the root with a merged copy.
    fn merge_reference_section(
        &self,
        converted: Vec<(ToolRule, &CanonicalRule)>,
    ) -> Result<Vec<ToolRule>, RulesyncError> {
        let Some((winner, winner_path, winner_source)) = converted
            .iter()
            .enumerate()
            .filter(|(_, (tool, _))| tool.is_root())
            .min_by_key(|(_, entry)| root_sort_key(entry))
            .map(|(i, (tool, canonical))| (i, tool.relative_path(), canonical.relative_path()))
        else {
            self.sink.emit(Diagnostic::debug(format!(
                "No root rule for {}, reference section skipped",
                self.target
            )));
            return Ok(converted.into_iter().map(|(tool, _)| tool).collect());
        };

        let mut dropped = BTreeSet::new();
        let losers = converted
            .iter()
            .enumerate()
            .filter(|(i, (tool, _))| tool.is_root() && *i != winner);
        for (loser, (tool, canonical)) in losers {
            let overwrites_root = tool.relative_path() == winner_path;
            self.sink.emit(
                Diagnostic::warn(format!(
                    "Multiple root rules for {}; using {}{}",
                    self.target,
                    winner_source.display(),
                    if overwrites_root {
                        ", this one is not written"
                    } else {
                        ", this one is left out of the reference section"
                    }
                ))
                .with_path(canonical.relative_path()),
            );
            if overwrites_root {
                dropped.insert(loser);
            }
        }

        let section = match self.adapter.reference_dialect() {
            Some(dialect) => {
                let entries: Vec<ReferenceEntry> = converted
                    .iter()
                    .filter(|(tool, _)| !tool.is_root())
                    .map(|(tool, canonical)| tool.reference_entry(canonical))
                    .collect();
                reference::generate(dialect, &entries)?
            }
            None => String::new(),
        };

        Ok(converted
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !dropped.contains(i))
            .map(|(i, (tool, _))| {
                if i == winner && !section.is_empty() {
                    tool.with_reference_section(section.clone())
                } else {
                    tool
                }
            })
            .collect())
    }

    /// Map tool rules back to canonical rules.
    ///
    /// Two tool files can import under the same canonical name (a legacy file
    /// and a per-rule `overview` file); the first one wins.
    pub fn convert_tool_files_to_rulesync_files(
        &mut self,
        tools: &[ToolRule],
    ) -> Result<Vec<CanonicalRule>, RulesyncError> {
        self.set_stage(BatchStage::Converting);
        let mut seen = BTreeSet::new();
        let mut rules = Vec::with_capacity(tools.len());
        for tool in tools {
            let rule = self.adapter.to_canonical(tool)?;
            if !seen.insert(rule.relative_file().to_path_buf()) {
                self.sink.emit(
                    Diagnostic::warn(format!(
                        "Duplicate canonical rule {}, keeping the first one",
                        rule.relative_path().display()
                    ))
                    .with_path(tool.relative_path()),
                );
                continue;
            }
            rules.push(rule);
        }
        Ok(rules)
    }

    /// Paths of the tool's rule files currently on disk, relative to the
    /// project root. Legacy files are never listed.
    pub async fn existing_tool_files(&self) -> Vec<PathBuf> {
        let layout = self.adapter.layout();
        let mut paths = Vec::new();
        if let Some(root) = layout.root_file {
            if tokio::fs::metadata(self.base_dir.join(root))
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                paths.push(PathBuf::from(root));
            }
        }
        let files = self
            .scan_dir(&self.base_dir.join(layout.rules_dir), |name| {
                layout.is_rule_file(name)
            })
            .await;
        paths.extend(
            files
                .into_iter()
                .map(|name| Path::new(layout.rules_dir).join(name)),
        );
        paths
    }

    /// Write tool rules, replacing existing files.
    pub fn write_tool_files(
        &mut self,
        tools: &[ToolRule],
        options: &WriteOptions,
    ) -> Result<Vec<OutputResult>, RulesyncError> {
        self.set_stage(BatchStage::Writing);
        let files = tools
            .iter()
            .map(|tool| {
                Ok(OutputFile {
                    label: self.target.to_string(),
                    relative_path: tool.relative_path(),
                    content: tool.content()?,
                })
            })
            .collect::<Result<Vec<_>, RulesyncError>>()?;
        let results = writer::write_output(&files, &options.clone().with_force(true))?;
        self.set_stage(BatchStage::Done);
        Ok(results)
    }

    /// Write canonical rules into `.rulesync/rules/`.
    pub fn write_rulesync_files(
        &mut self,
        rules: &[CanonicalRule],
        options: &WriteOptions,
    ) -> Result<Vec<OutputResult>, RulesyncError> {
        self.set_stage(BatchStage::Writing);
        let files = rules
            .iter()
            .map(|rule| {
                Ok(OutputFile {
                    label: RULESYNC_LABEL.to_string(),
                    relative_path: rule.relative_path(),
                    content: rule.to_file_content()?,
                })
            })
            .collect::<Result<Vec<_>, RulesyncError>>()?;
        let results = writer::write_output(&files, options)?;
        self.set_stage(BatchStage::Done);
        Ok(results)
    }

    /// Sorted names of the regular files in `dir` accepted by `filter`.
    async fn scan_dir(&self, dir: &Path, filter: impl Fn(&str) -> bool) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                self.sink.emit(
                    Diagnostic::debug(format!("Nothing to scan: {}", e)).with_path(dir),
                );
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let is_file = entry
                        .file_type()
                        .await
                        .map(|t| t.is_file())
                        .unwrap_or(false);
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if is_file && filter(&name) {
                        names.push(name);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    self.sink.emit(
                        Diagnostic::warn(format!("Directory scan stopped early: {}", e))
                            .with_path(dir),
                    );
                    break;
                }
            }
        }
        names.sort();
        names
    }

    fn collect<T>(&self, results: Vec<(PathBuf, Result<T, RulesyncError>)>) -> LoadOutcome<T> {
        let mut outcome = LoadOutcome::empty();
        for (path, result) in results {
            match result {
                Ok(item) => outcome.items.push(item),
                Err(e) => {
                    let what = if e.is_per_file() {
                        "invalid rule"
                    } else {
                        "unreadable file"
                    };
                    self.sink.emit(
                        Diagnostic::warn(format!("Skipped {}: {}", what, e))
                            .with_path(path.clone()),
                    );
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        outcome
    }
}

/// Root tie-break order: output path first, then the canonical source path.
fn root_sort_key(entry: &(ToolRule, &CanonicalRule)) -> (String, PathBuf) {
    (entry.0.relative_path_string(), entry.1.relative_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleFrontmatter, RuleTargets};
    use crate::utils::diagnostics::MemorySink;

    fn rule(file: &str, root: bool, description: &str, globs: &[&str]) -> CanonicalRule {
        CanonicalRule::new(
            file,
            RuleFrontmatter {
                root,
                targets: RuleTargets::All,
                description: description.to_string(),
                globs: globs.iter().map(|g| g.to_string()).collect(),
                tags: None,
            },
            format!("Body of {}", file),
        )
    }

    fn processor(target: ToolTarget, sink: Arc<MemorySink>) -> RuleProcessor {
        RuleProcessor::new("/project", target, &AdapterRegistry::builtin(), sink).unwrap()
    }

    #[test]
    fn test_unregistered_target_is_fatal() {
        let err = RuleProcessor::new(
            "/project",
            ToolTarget::Cursor,
            &AdapterRegistry::empty(),
            Arc::new(MemorySink::new()),
        )
        .unwrap_err();
        assert!(matches!(err, RulesyncError::UnsupportedTarget { .. }));
    }

    #[test]
    fn test_reference_section_lists_only_non_root_rules() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = processor(ToolTarget::Claudecode, sink);
        let tools = processor
            .convert_rulesync_files_to_tool_files(&[
                rule("rule-a.md", true, "A", &[]),
                rule("rule-b.md", false, "B", &["**/*.ts"]),
            ])
            .unwrap();

        let root = tools.iter().find(|t| t.is_root()).unwrap();
        let section = root.reference_section().unwrap();
        assert!(section.contains("@.claude/memories/rule-b.md"));
        assert!(section.contains("description: \"B\""));
        assert!(section.contains("globs: \"**/*.ts\""));
        assert!(!section.contains("rule-a"));
        assert_eq!(processor.stage(), BatchStage::Merging);
    }

    #[test]
    fn test_no_root_means_no_section() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = processor(ToolTarget::Geminicli, sink);
        let tools = processor
            .convert_rulesync_files_to_tool_files(&[rule("a.md", false, "A", &[])])
            .unwrap();
        assert!(tools.iter().all(|t| t.reference_section().is_none()));
    }

    #[test]
    fn test_tool_without_dialect_gets_no_section() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = processor(ToolTarget::Cursor, sink);
        let tools = processor
            .convert_rulesync_files_to_tool_files(&[
                rule("overview.md", true, "", &[]),
                rule("b.md", false, "B", &[]),
            ])
            .unwrap();
        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|t| t.reference_section().is_none()));
    }

    #[test]
    fn test_multiple_roots_pick_first_path_and_warn() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = processor(ToolTarget::Claudecode, sink.clone());
        let tools = processor
            .convert_rulesync_files_to_tool_files(&[
                rule("zeta.md", true, "", &[]),
                rule("alpha.md", true, "", &[]),
                rule("other.md", false, "", &[]),
            ])
            .unwrap();

        let roots: Vec<_> = tools.iter().filter(|t| t.is_root()).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].body(), "Body of alpha.md");
        assert!(roots[0].reference_section().is_some());

        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].path.as_deref(),
            Some(Path::new(".rulesync/rules/zeta.md"))
        );
    }

    #[test]
    fn test_multiple_roots_in_rules_dir_are_all_written() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = processor(ToolTarget::Cursor, sink.clone());
        let tools = processor
            .convert_rulesync_files_to_tool_files(&[
                rule("zeta.md", true, "", &[]),
                rule("alpha.md", true, "", &[]),
            ])
            .unwrap();

        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|t| t.is_root()));
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("alpha.md"));
        assert!(warnings[0].message.contains("left out of the reference section"));
        assert_eq!(
            warnings[0].path.as_deref(),
            Some(Path::new(".rulesync/rules/zeta.md"))
        );
    }

    #[test]
    fn test_targets_filter_rules() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = processor(ToolTarget::Cursor, sink);
        let only_claude = CanonicalRule::new(
            "claude-only.md",
            RuleFrontmatter {
                targets: RuleTargets::Only([ToolTarget::Claudecode].into_iter().collect()),
                ..Default::default()
            },
            "x",
        );
        let tools = processor
            .convert_rulesync_files_to_tool_files(&[only_claude, rule("all.md", false, "", &[])])
            .unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].relative_file(), "all.mdc");
    }

    #[test]
    fn test_import_deduplicates_canonical_names() {
        let sink = Arc::new(MemorySink::new());
        let mut processor = processor(ToolTarget::Roo, sink.clone());
        let base = Path::new("/project");
        let adapter = AdapterRegistry::builtin().get(ToolTarget::Roo).unwrap();
        let tools = vec![
            adapter
                .from_native_file(base, Path::new(".roorules"), "legacy")
                .unwrap(),
            adapter
                .from_native_file(base, Path::new(".roo/rules/overview.md"), "modern")
                .unwrap(),
        ];
        let rules = processor.convert_tool_files_to_rulesync_files(&tools).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].body(), "legacy");
        assert_eq!(sink.warnings().len(), 1);
    }
}
