//! Rule loading and normalization.

pub(crate) mod shape;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Lookup;
use crate::index::RuleIndex;
use crate::repo::ContentRepo;
use crate::types::{RuleDetails, RuleSearchResult, Severity};

/// Remediation types probed in source rule directories.
pub const SOURCE_REMEDIATION_TYPES: [&str; 5] =
    ["bash", "ansible", "anaconda", "puppet", "ignition"];

const SUMMARY_DESCRIPTION_CHARS: usize = 200;

/// Loads single rules from their source YAML.
///
/// Nothing here is cached: every load re-reads the file, so details always
/// reflect the current tree. Only the path index is shared state.
pub struct RuleLoader<'a> {
    repo: &'a ContentRepo,
    index: &'a RuleIndex,
}

impl<'a> RuleLoader<'a> {
    /// Loader over `repo`, resolving ids through `index`.
    pub fn new(repo: &'a ContentRepo, index: &'a RuleIndex) -> Self {
        Self { repo, index }
    }

    /// Full detail record for `rule_id`, without rendered content.
    pub fn load_details(&self, rule_id: &str) -> Lookup<RuleDetails> {
        let Some(path) = self.index.lookup(rule_id) else {
            return Lookup::NotFound;
        };

        let doc = match shape::read_yaml_mapping(&path) {
            Ok(doc) => doc,
            Err(err) => {
                debug!(rule_id, error = %err, "rule yaml unusable");
                return Lookup::Malformed(err.to_string());
            }
        };
        let rule_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let title = doc
            .get("title")
            .and_then(shape::scalar_string)
            .unwrap_or_else(|| rule_id.to_string());
        let description = doc
            .get("description")
            .and_then(shape::scalar_string)
            .unwrap_or_default();
        let rationale = doc.get("rationale").and_then(shape::scalar_string);
        let severity = doc
            .get("severity")
            .and_then(shape::scalar_string)
            .map(Severity::from)
            .unwrap_or_default();

        // `platform` (singular) wins when both spellings are present.
        let platforms = match doc.get("platform") {
            Some(value) => shape::string_or_list(value),
            None => doc
                .get("platforms")
                .map(shape::string_or_list)
                .unwrap_or_default(),
        };

        let last_modified = fs::metadata(&path)
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from);

        Lookup::Found(RuleDetails {
            rule_id: rule_id.to_string(),
            title,
            description,
            rationale,
            severity,
            identifiers: shape::identifiers_from(doc.get("identifiers")),
            references: shape::references_from(doc.get("references")),
            products: shape::products_from(&doc),
            platforms,
            remediations: source_remediations(rule_dir),
            checks: source_checks(rule_dir),
            test_scenarios: test_scenarios(rule_dir),
            file_path: self.repo.relative(&path),
            rule_dir: self.repo.relative(rule_dir),
            last_modified,
            template: doc.get("template").cloned(),
            rendered: None,
        })
    }

    /// Minimal projection used by rule search.
    pub fn load_search_result(&self, rule_id: &str, path: &Path) -> Lookup<RuleSearchResult> {
        let doc = match shape::read_yaml_mapping(path) {
            Ok(doc) => doc,
            Err(err) => {
                debug!(rule_id, error = %err, "skipping unparsable rule");
                return Lookup::Malformed(err.to_string());
            }
        };

        let title = doc
            .get("title")
            .and_then(shape::scalar_string)
            .unwrap_or_else(|| rule_id.to_string());
        let severity = doc
            .get("severity")
            .and_then(shape::scalar_string)
            .map(Severity::from)
            .unwrap_or_default();
        let description = doc
            .get("description")
            .and_then(shape::scalar_string)
            .unwrap_or_default();

        Lookup::Found(RuleSearchResult {
            rule_id: rule_id.to_string(),
            title,
            severity,
            description: shape::truncate_chars(&description, SUMMARY_DESCRIPTION_CHARS),
            products: shape::products_from(&doc),
            file_path: self.repo.relative(path),
        })
    }
}

/// Remediation availability probes.
///
/// A type is available when `<rule_dir>/<type>/` is non-empty or a
/// `<type>.sh` / `<type>.yml` file sits beside `rule.yml`. Content is
/// never read.
fn source_remediations(rule_dir: &Path) -> BTreeMap<String, bool> {
    let mut out = BTreeMap::new();
    for rem_type in SOURCE_REMEDIATION_TYPES {
        let available = dir_non_empty(&rule_dir.join(rem_type))
            || rule_dir.join(format!("{rem_type}.sh")).is_file()
            || rule_dir.join(format!("{rem_type}.yml")).is_file();
        out.insert(rem_type.to_string(), available);
    }
    out
}

/// Check availability probes; OVAL is the only source check type.
fn source_checks(rule_dir: &Path) -> BTreeMap<String, bool> {
    let available = dir_non_empty(&rule_dir.join("oval")) || rule_dir.join("oval.xml").is_file();
    BTreeMap::from([("oval".to_string(), available)])
}

/// Sorted `tests/*.sh` scenario names.
fn test_scenarios(rule_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(rule_dir.join("tests")) else {
        return Vec::new();
    };
    let mut scenarios: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sh"))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    scenarios.sort();
    scenarios
}

fn dir_non_empty(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
