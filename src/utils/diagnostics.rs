// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics emitted while a batch runs.
//!
//! The processor reports skipped files and tie-breaks through a
//! [`DiagnosticSink`] it is handed at construction. The binary uses
//! [`TracingSink`]; tests use [`MemorySink`] and assert on what was recorded.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// File the diagnostic is about, if any.
    pub path: Option<PathBuf>,
}

impl Diagnostic {
    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Debug,
            message: message.into(),
            path: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message: message.into(),
            path: None,
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Receiver for batch diagnostics.
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let path = diagnostic
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match diagnostic.level {
            DiagnosticLevel::Debug => tracing::debug!(path = %path, "{}", diagnostic.message),
            DiagnosticLevel::Info => tracing::info!(path = %path, "{}", diagnostic.message),
            DiagnosticLevel::Warn => tracing::warn!(path = %path, "{}", diagnostic.message),
        }
    }
}

/// Records diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        match self.records.lock() {
            Ok(mut records) => records.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
