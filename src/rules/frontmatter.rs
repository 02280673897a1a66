// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Frontmatter splitting and field access shared by every rule dialect.
//!
//! Documents optionally start with a `---` delimited YAML block. Field
//! readers return [`RulesyncError::InvalidFrontmatter`] naming the field
//! whenever a value has the wrong shape.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use std::sync::LazyLock;

use crate::utils::error::RulesyncError;

const DELIMITER: &str = "---";

/// Matches `globs:` lines whose value starts with a bare `*`, which YAML
/// would otherwise read as an alias.
static BARE_GLOB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?P<key>[ \t]*globs[ \t]*:[ \t]*)(?P<value>\*[^\r\n]*?)[ \t]*(?P<eol>\r?)$")
        .expect("bare glob regex is invalid")
});

/// A document split into its raw frontmatter text and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub frontmatter: Option<&'a str>,
    pub body: &'a str,
}

/// Split a document into frontmatter and body.
///
/// A document has frontmatter only when its first line is `---`. The block
/// ends at the next line that is exactly `---`.
pub fn split<'a>(path: &Path, content: &'a str) -> Result<SplitDocument<'a>, RulesyncError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(first_line_end) = content.find('\n') else {
        if content.trim_end() == DELIMITER {
            return Err(unclosed(path));
        }
        return Ok(SplitDocument {
            frontmatter: None,
            body: content,
        });
    };

    let (first_line, rest) = content.split_at(first_line_end);
    if first_line.trim_end() != DELIMITER {
        return Ok(SplitDocument {
            frontmatter: None,
            body: content,
        });
    }

    // Skip the newline that terminated the opening delimiter.
    let rest = rest.get(1..).unwrap_or_default();

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let frontmatter = rest.get(..offset).unwrap_or_default();
            let body = rest.get(offset + line.len()..).unwrap_or_default();
            return Ok(SplitDocument {
                frontmatter: Some(frontmatter),
                body,
            });
        }
        offset += line.len();
    }

    Err(unclosed(path))
}

fn unclosed(path: &Path) -> RulesyncError {
    RulesyncError::parse(path, "Unclosed YAML frontmatter (missing closing ---)")
}

/// Quote `globs:` values that start with an unquoted `*`.
pub fn quote_bare_globs(frontmatter: &str) -> String {
    BARE_GLOB_RE
        .replace_all(frontmatter, |caps: &regex::Captures<'_>| {
            let value = caps.name("value").map_or("", |m| m.as_str());
            let key = caps.name("key").map_or("", |m| m.as_str());
            let eol = caps.name("eol").map_or("", |m| m.as_str());
            format!("{}\"{}\"{}", key, value.replace('"', "\\\""), eol)
        })
        .into_owned()
}

/// Parse a frontmatter block into a YAML mapping.
///
/// An empty block yields an empty mapping; anything other than a mapping is
/// a parse error.
pub fn parse_mapping(path: &Path, frontmatter: &str) -> Result<Mapping, RulesyncError> {
    let prepared = quote_bare_globs(frontmatter);
    if prepared.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value =
        serde_yaml::from_str(&prepared).map_err(|e| RulesyncError::yaml(path, e))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(RulesyncError::parse(
            path,
            format!("Frontmatter must be a mapping, found {}", value_kind(&other)),
        )),
    }
}

/// Split and parse a document in one step.
pub fn parse_document<'a>(
    path: &Path,
    content: &'a str,
) -> Result<(Mapping, &'a str), RulesyncError> {
    let split = split(path, content)?;
    let mapping = match split.frontmatter {
        Some(raw) => parse_mapping(path, raw)?,
        None => Mapping::new(),
    };
    Ok((mapping, split.body))
}

/// Render a frontmatter mapping followed by the body.
///
/// An empty mapping renders the body alone.
pub fn render(path: &Path, mapping: &Mapping, body: &str) -> Result<String, RulesyncError> {
    if mapping.is_empty() {
        return Ok(format!("{}\n", body.trim()));
    }
    let yaml = serde_yaml::to_string(mapping).map_err(|e| RulesyncError::yaml(path, e))?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{}\n", body.trim()))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Read an optional boolean. Quoted `"true"`/`"false"` are accepted.
pub fn get_bool(path: &Path, mapping: &Mapping, field: &str) -> Result<Option<bool>, RulesyncError> {
    match mapping.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(RulesyncError::invalid_field(
                path,
                field,
                format!("must be a boolean, found string \"{}\"", s),
            )),
        },
        Some(other) => Err(RulesyncError::invalid_field(
            path,
            field,
            format!("must be a boolean, found {}", value_kind(other)),
        )),
    }
}

/// Read an optional string. Scalars other than strings are rejected.
pub fn get_string(
    path: &Path,
    mapping: &Mapping,
    field: &str,
) -> Result<Option<String>, RulesyncError> {
    match mapping.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(RulesyncError::invalid_field(
            path,
            field,
            format!("must be a string, found {}", value_kind(other)),
        )),
    }
}

/// Read an optional sequence of strings, rejecting any other shape.
pub fn get_string_seq(
    path: &Path,
    mapping: &Mapping,
    field: &str,
) -> Result<Option<Vec<String>>, RulesyncError> {
    match mapping.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(RulesyncError::invalid_field(
                    path,
                    field,
                    format!("entries must be strings, found {}", value_kind(other)),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(RulesyncError::invalid_field(
            path,
            field,
            format!("must be a sequence, found {}", value_kind(other)),
        )),
    }
}

/// Read a glob list that native dialects spell either as a sequence or as a
/// comma separated string.
pub fn get_globs(path: &Path, mapping: &Mapping, field: &str) -> Result<Vec<String>, RulesyncError> {
    match mapping.get(field) {
        Some(Value::String(s)) => Ok(split_globs(s)),
        _ => Ok(get_string_seq(path, mapping, field)?
            .unwrap_or_default()
            .iter()
            .flat_map(|s| split_globs(s))
            .collect()),
    }
}

/// Split a comma separated glob list, dropping empty entries.
pub fn split_globs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> &'static Path {
        Path::new("rule.md")
    }

    #[test]
    fn test_split_without_frontmatter() {
        let doc = split(p(), "# Title\n\nBody").unwrap();
        assert_eq!(doc.frontmatter, None);
        assert_eq!(doc.body, "# Title\n\nBody");
    }

    #[test]
    fn test_split_result_outlives_path() {
        let content = String::from("---\nroot: true\n---\nBody");
        let doc = {
            let path = std::path::PathBuf::from("short-lived.md");
            split(&path, &content).unwrap()
        };
        assert_eq!(doc.frontmatter, Some("root: true\n"));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_split_with_frontmatter() {
        let doc = split(p(), "---\nroot: true\n---\n\nBody\n").unwrap();
        assert_eq!(doc.frontmatter, Some("root: true\n"));
        assert_eq!(doc.body, "\nBody\n");
    }

    #[test]
    fn test_split_empty_frontmatter() {
        let doc = split(p(), "---\n---\nBody").unwrap();
        assert_eq!(doc.frontmatter, Some(""));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_split_handles_crlf() {
        let doc = split(p(), "---\r\nroot: true\r\n---\r\nBody").unwrap();
        assert_eq!(doc.frontmatter, Some("root: true\r\n"));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_split_unclosed_is_parse_error() {
        let err = split(p(), "---\nroot: true\nBody").unwrap_err();
        assert!(matches!(err, RulesyncError::Parse { .. }));
    }

    #[test]
    fn test_quote_bare_globs() {
        assert_eq!(quote_bare_globs("globs: *"), "globs: \"*\"");
        assert_eq!(
            quote_bare_globs("description: x\nglobs: **/*.ts,*.tsx\n"),
            "description: x\nglobs: \"**/*.ts,*.tsx\"\n"
        );
        assert_eq!(quote_bare_globs("globs: \"*\""), "globs: \"*\"");
        assert_eq!(quote_bare_globs("globs: src/**"), "globs: src/**");
    }

    #[test]
    fn test_bare_star_parses_as_single_glob() {
        let mapping = parse_mapping(p(), "globs: *\nalwaysApply: false\n").unwrap();
        assert_eq!(get_globs(p(), &mapping, "globs").unwrap(), vec!["*"]);

        let quoted = parse_mapping(p(), "globs: \"*\"\n").unwrap();
        assert_eq!(get_globs(p(), &quoted, "globs").unwrap(), vec!["*"]);
    }

    #[test]
    fn test_globs_accept_sequence_and_comma_string() {
        let seq = parse_mapping(p(), "globs:\n  - \"**/*.ts\"\n  - \"**/*.tsx\"\n").unwrap();
        let csv = parse_mapping(p(), "globs: \"**/*.ts, **/*.tsx\"\n").unwrap();
        assert_eq!(
            get_globs(p(), &seq, "globs").unwrap(),
            get_globs(p(), &csv, "globs").unwrap()
        );
    }

    #[test]
    fn test_get_bool_accepts_quoted_strings() {
        let mapping = parse_mapping(p(), "a: \"true\"\nb: false\nc: yes-please\n").unwrap();
        assert_eq!(get_bool(p(), &mapping, "a").unwrap(), Some(true));
        assert_eq!(get_bool(p(), &mapping, "b").unwrap(), Some(false));
        assert_eq!(get_bool(p(), &mapping, "missing").unwrap(), None);
        let err = get_bool(p(), &mapping, "c").unwrap_err();
        assert!(matches!(err, RulesyncError::InvalidFrontmatter { ref field, .. } if field == "c"));
    }

    #[test]
    fn test_get_string_seq_rejects_scalar() {
        let mapping = parse_mapping(p(), "targets: claudecode\n").unwrap();
        let err = get_string_seq(p(), &mapping, "targets").unwrap_err();
        assert!(
            matches!(err, RulesyncError::InvalidFrontmatter { ref field, .. } if field == "targets")
        );
    }

    #[test]
    fn test_non_mapping_frontmatter_is_rejected() {
        let err = parse_mapping(p(), "- a\n- b\n").unwrap_err();
        assert!(matches!(err, RulesyncError::Parse { .. }));
    }

    #[test]
    fn test_render_empty_mapping_is_body_only() {
        assert_eq!(render(p(), &Mapping::new(), "\n Body \n").unwrap(), "Body\n");
    }
}
