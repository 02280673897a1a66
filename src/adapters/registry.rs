// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Lookup table from tool target to adapter.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::augmentcode::AugmentCodeAdapter;
use super::copilot::CopilotAdapter;
use super::cursor::CursorAdapter;
use super::kiro::KiroAdapter;
use super::markdown::MarkdownAdapter;
use super::windsurf::WindsurfAdapter;
use super::{RuleAdapter, ToolTarget};
use crate::utils::error::RulesyncError;

/// Adapters keyed by target. Adding a tool means registering one entry.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: BTreeMap<ToolTarget, Arc<dyn RuleAdapter>>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Registry with every built-in tool.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(MarkdownAdapter::agentsmd());
        registry.register(MarkdownAdapter::amazonqcli());
        registry.register(AugmentCodeAdapter);
        registry.register(MarkdownAdapter::augmentcode_legacy());
        registry.register(MarkdownAdapter::claudecode());
        registry.register(MarkdownAdapter::cline());
        registry.register(MarkdownAdapter::codexcli());
        registry.register(CopilotAdapter);
        registry.register(CursorAdapter);
        registry.register(MarkdownAdapter::geminicli());
        registry.register(MarkdownAdapter::junie());
        registry.register(KiroAdapter);
        registry.register(MarkdownAdapter::opencode());
        registry.register(MarkdownAdapter::qwencode());
        registry.register(MarkdownAdapter::roo());
        registry.register(MarkdownAdapter::warp());
        registry.register(WindsurfAdapter);
        registry
    }

    /// Add or replace the adapter for its target.
    pub fn register(&mut self, adapter: impl RuleAdapter + 'static) {
        self.adapters.insert(adapter.target(), Arc::new(adapter));
    }

    pub fn get(&self, target: ToolTarget) -> Result<Arc<dyn RuleAdapter>, RulesyncError> {
        self.adapters
            .get(&target)
            .cloned()
            .ok_or_else(|| RulesyncError::unsupported_target(target.as_str()))
    }

    /// Registered targets in stable order.
    pub fn targets(&self) -> Vec<ToolTarget> {
        self.adapters.keys().copied().collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("targets", &self.targets())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_target() {
        let registry = AdapterRegistry::builtin();
        assert_eq!(registry.targets(), ToolTarget::ALL.to_vec());
        for target in ToolTarget::ALL {
            assert_eq!(registry.get(target).unwrap().target(), target);
        }
    }

    #[test]
    fn test_empty_registry_rejects_lookup() {
        let registry = AdapterRegistry::empty();
        let err = registry.get(ToolTarget::Cursor).err().unwrap();
        assert!(matches!(err, RulesyncError::UnsupportedTarget { .. }));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = AdapterRegistry::empty();
        registry.register(MarkdownAdapter::claudecode());
        registry.register(MarkdownAdapter::claudecode());
        assert_eq!(registry.targets(), vec![ToolTarget::Claudecode]);
    }
}
