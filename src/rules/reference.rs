// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

//! Reference sections listing auxiliary rules inside a root document.
//!
//! Two dialects exist. The structured one is an indented XML block whose
//! entries omit empty descriptions and glob lists. The plain one renders one
//! line per rule and always prints both fields, empty or not. Tools depend on
//! the exact shape of each, so the asymmetry is kept as is.

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};

use crate::utils::error::RulesyncError;

const STRUCTURED_HEADER: &str = "Please also reference the following documents as needed. \
In this case, `@` stands for the project root directory.";

const PLAIN_HEADER: &str = "Please also reference the following documents as needed:";

/// Output dialect of a reference section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceDialect {
    /// Nested `<Documents>` block.
    Structured,
    /// One `@path description: "..." globs: "..."` line per rule.
    Plain,
}

/// One auxiliary rule to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Path relative to the project root, without the `@` prefix.
    pub path: String,
    pub description: String,
    pub globs: Vec<String>,
}

impl ReferenceEntry {
    fn at_path(&self) -> String {
        format!("@{}", self.path)
    }
}

/// Build the reference section for a set of non-root rules.
///
/// Returns an empty string when there is nothing to reference.
pub fn generate(dialect: ReferenceDialect, entries: &[ReferenceEntry]) -> Result<String, RulesyncError> {
    if entries.is_empty() {
        return Ok(String::new());
    }
    match dialect {
        ReferenceDialect::Structured => generate_structured(entries),
        ReferenceDialect::Plain => Ok(generate_plain(entries)),
    }
}

fn generate_structured(entries: &[ReferenceEntry]) -> Result<String, RulesyncError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(&mut writer, Event::Start(BytesStart::new("Documents")))?;
    for entry in entries {
        emit(&mut writer, Event::Start(BytesStart::new("Document")))?;
        text_element(&mut writer, "Path", &entry.at_path())?;
        if !entry.description.is_empty() {
            text_element(&mut writer, "Description", &entry.description)?;
        }
        if !entry.globs.is_empty() {
            text_element(&mut writer, "FilePatterns", &entry.globs.join(", "))?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("Document")))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("Documents")))?;

    let xml = String::from_utf8(writer.into_inner())
        .map_err(|e| RulesyncError::ReferenceSection(e.to_string()))?;

    Ok(format!("{STRUCTURED_HEADER}\n\n{xml}\n\n"))
}

fn text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), RulesyncError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(
        writer,
        Event::Text(BytesText::from_escaped(partial_escape(text))),
    )?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RulesyncError> {
    writer
        .write_event(event)
        .map_err(|e| RulesyncError::ReferenceSection(e.to_string()))
}

fn generate_plain(entries: &[ReferenceEntry]) -> String {
    let mut lines = vec![PLAIN_HEADER.to_string(), String::new()];
    for entry in entries {
        let description = entry.description.replace('"', "\\\"");
        let globs = entry.globs.join(",");
        lines.push(format!(
            "{} description: \"{}\" globs: \"{}\"",
            entry.at_path(),
            description,
            globs
        ));
    }
    format!("{}\n\n", lines.join("\n"))
}
