//! Mode inference for Cursor style documents, end to end through the adapter.

use rulesync::adapters::RuleAdapter;
use rulesync::adapters::cursor::CursorAdapter;
use rulesync::rules::classify::{ModeSignals, RuleMode, classify};
use std::path::Path;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_decision_table_covers_every_combination() {
    // (alwaysApply, description, globs) -> (mode, description, globs)
    let cases: [(bool, &str, &[&str], RuleMode, &str, &[&str]); 8] = [
        (true, "", &[], RuleMode::Always, "", &["**/*"]),
        (true, "", &["src/**"], RuleMode::Always, "", &["**/*"]),
        (true, "Style", &[], RuleMode::Always, "Style", &["**/*"]),
        (true, "Style", &["src/**"], RuleMode::Always, "Style", &["**/*"]),
        (false, "", &[], RuleMode::Manual, "", &[]),
        (false, "", &["src/**"], RuleMode::SpecificFiles, "", &["src/**"]),
        (false, "Style", &[], RuleMode::Intelligently, "Style", &[]),
        (false, "Style", &["src/**"], RuleMode::SpecificFiles, "", &["src/**"]),
    ];

    for (always_apply, description, globs, mode, expected_description, expected_globs) in cases {
        let classified = classify(&ModeSignals {
            description: description.to_string(),
            globs: strings(globs),
            always_apply: Some(always_apply),
        });
        assert_eq!(
            classified.mode, mode,
            "alwaysApply={} description={:?} globs={:?}",
            always_apply, description, globs
        );
        assert_eq!(classified.description, expected_description);
        assert_eq!(classified.globs, strings(expected_globs));
    }
}

#[test]
fn test_unset_always_apply_behaves_like_false() {
    for (description, globs) in [("", vec![]), ("D", vec![]), ("", strings(&["*.rs"]))] {
        let unset = classify(&ModeSignals {
            description: description.to_string(),
            globs: globs.clone(),
            always_apply: None,
        });
        let off = classify(&ModeSignals {
            description: description.to_string(),
            globs,
            always_apply: Some(false),
        });
        assert_eq!(unset, off);
    }
}

fn import(content: &str) -> rulesync::rules::CanonicalRule {
    let adapter = CursorAdapter;
    let rule = adapter
        .from_native_file(Path::new("/project"), Path::new(".cursor/rules/x.mdc"), content)
        .unwrap();
    adapter.to_canonical(&rule).unwrap()
}

#[test]
fn test_cursor_import_applies_the_table() {
    let always = import("---\nalwaysApply: true\nglobs: src/**\n---\nAlways");
    assert_eq!(always.globs(), ["**/*"]);
    assert!(!always.is_root());

    let specific = import("---\ndescription: Ignored\nglobs: src/**,tests/**\n---\nFiles");
    assert_eq!(specific.description(), "");
    assert_eq!(specific.globs(), ["src/**", "tests/**"]);

    let intelligent = import("---\ndescription: Database work\n---\nDB");
    assert_eq!(intelligent.description(), "Database work");
    assert!(intelligent.globs().is_empty());

    let manual = import("No frontmatter at all");
    assert_eq!(manual.description(), "");
    assert!(manual.globs().is_empty());
    assert_eq!(manual.body(), "No frontmatter at all");
}

#[test]
fn test_quoted_boolean_is_accepted() {
    let rule = import("---\nalwaysApply: \"true\"\n---\nBody");
    assert_eq!(rule.globs(), ["**/*"]);
}
