//! Parser for the profile file grammar.
//!
//! `.profile` files look like YAML but are a constrained line format:
//! top-level `key:` lines, a `selections:` block of `- ` items, and
//! indented continuation lines belonging to the preceding multi-line
//! field. Generic YAML parsing mishandles the continuation rules, so this
//! is a line state machine instead. It never fails: malformed input
//! degrades to whatever fields were recognized.

use std::collections::BTreeMap;

use tracing::debug;

/// Which multi-line block the parser is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Description,
    Selections,
}

/// Parsed profile record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedProfile {
    /// Title, when a `title:` line was present.
    pub title: Option<String>,
    /// Description lines joined with single spaces; empty when absent.
    pub description: String,
    /// Parent profile from `extends:`.
    pub extends: Option<String>,
    /// Selected rule ids in file order; `!unselect` entries are dropped.
    pub selections: Vec<String>,
    /// Variable overrides. The grammar does not carry any, so this stays
    /// empty; kept so records round-trip the full profile shape.
    pub variables: BTreeMap<String, String>,
    /// Control file reference from `controls:`.
    pub controls: Option<String>,
}

/// Parse profile text.
///
/// A recognized key at the start of a line always wins over the current
/// section and resets it. Inside a section, a non-indented line (for
/// descriptions) or a non-`-` line (for selections) ends the section and
/// is itself discarded in the same pass, not reprocessed.
pub fn parse_profile(content: &str) -> ParsedProfile {
    let mut profile = ParsedProfile::default();
    let mut section = Section::None;
    let mut description_lines: Vec<String> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("documentation_complete:") {
            // Header noise; does not touch the current section.
            continue;
        } else if let Some(rest) = line.strip_prefix("title:") {
            profile.title = Some(strip_quotes(rest.trim()).to_string());
            section = Section::None;
        } else if let Some(rest) = line.strip_prefix("description:") {
            let first = strip_quotes(rest.trim());
            if !first.is_empty() {
                description_lines.push(first.to_string());
            }
            section = Section::Description;
        } else if let Some(rest) = line.strip_prefix("extends:") {
            profile.extends = Some(rest.trim().to_string());
            section = Section::None;
        } else if line.starts_with("selections:") {
            section = Section::Selections;
        } else if let Some(rest) = line.strip_prefix("controls:") {
            profile.controls = Some(rest.trim().to_string());
            section = Section::None;
        } else {
            match section {
                Section::Description => {
                    if line.starts_with(' ') || line.starts_with('\t') {
                        description_lines.push(line.trim().to_string());
                    } else {
                        section = Section::None;
                    }
                }
                Section::Selections => {
                    if let Some(item) = line.trim().strip_prefix('-') {
                        let selection = item.trim();
                        if let Some(dropped) = selection.strip_prefix("!unselect") {
                            debug!(rule = dropped.trim_start_matches('='), "dropping unselect entry");
                        } else {
                            profile.selections.push(selection.to_string());
                        }
                    } else {
                        section = Section::None;
                    }
                }
                Section::None => {}
            }
        }
    }

    profile.description = description_lines.join(" ");
    profile
}

/// Trim surrounding single and double quote characters.
fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '\'' || c == '"')
}
