//! Permissive extraction from loosely-shaped content YAML.
//!
//! Rule and product sources are hand-written YAML with no schema: fields
//! appear as strings in one file and lists in the next, identifier keys
//! grow `@product` suffixes, and templating artifacts leave odd scalars
//! behind. Everything here normalizes instead of validating, so one odd
//! field degrades to an empty value rather than sinking the whole record.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::types::{Identifiers, References};

/// Read `path` and parse it as a YAML mapping.
pub(crate) fn read_yaml_mapping(path: &Path) -> DiscoveryResult<Value> {
    let text = fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_yaml::from_str(&text).map_err(|source| DiscoveryError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if doc.is_mapping() {
        Ok(doc)
    } else {
        Err(DiscoveryError::Shape {
            path: path.to_path_buf(),
            detail: "top level is not a mapping".to_string(),
        })
    }
}

/// A scalar coerced to its string form; `None` for null and collections.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// A `string | list` field normalized to a list.
///
/// A bare string becomes a one-element list; list items are coerced
/// scalar-wise; anything else contributes nothing.
pub(crate) fn string_or_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => vec![text.clone()],
        Value::Sequence(items) => items.iter().filter_map(scalar_string).collect(),
        _ => Vec::new(),
    }
}

/// First element of a list, or the scalar itself.
fn first_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => items.first().and_then(scalar_string),
        other => scalar_string(other),
    }
}

/// Identifier fields from an `identifiers:` mapping.
///
/// Only the bare well-known keys populate typed fields. Product-suffixed
/// keys (`cce@rhel8`) and anything else land in `extra` verbatim, so no
/// identifier is lost to an unexpected name.
pub(crate) fn identifiers_from(section: Option<&Value>) -> Identifiers {
    let mut out = Identifiers::default();
    let Some(Value::Mapping(map)) = section else {
        return out;
    };

    for (key, value) in map {
        let Some(key) = key.as_str() else { continue };
        match key {
            "cce" => out.cce = first_scalar(value),
            "cis" => out.cis = non_empty(string_or_list(value)),
            "nist" => out.nist = non_empty(string_or_list(value)),
            "stigid" => out.stigid = scalar_string(value),
            _ => {
                if let Some(text) = scalar_string(value) {
                    out.extra.insert(key.to_string(), text);
                }
            }
        }
    }
    out
}

/// Reference lists from a `references:` mapping.
pub(crate) fn references_from(section: Option<&Value>) -> References {
    let mut out = References::default();
    let Some(Value::Mapping(map)) = section else {
        return out;
    };

    for (key, value) in map {
        let Some(key) = key.as_str() else { continue };
        let values = string_or_list(value);
        match key {
            "nist" => out.nist = values,
            "cis" => out.cis = values,
            "cui" => out.cui = values,
            "disa" => out.disa = values,
            "isa-62443" => out.isa_62443 = values,
            "pcidss" => out.pcidss = values,
            "hipaa" => out.hipaa = values,
            _ => {
                out.extra.insert(key.to_string(), values);
            }
        }
    }
    out
}

/// Products inferred from `name@product` keys in the identifier and
/// reference mappings, sorted and deduplicated.
pub(crate) fn products_from(doc: &Value) -> Vec<String> {
    let mut products = BTreeSet::new();
    for section in ["identifiers", "references"] {
        let Some(Value::Mapping(map)) = doc.get(section) else {
            continue;
        };
        for (key, _) in map {
            let Some(key) = key.as_str() else { continue };
            if let Some(product) = key.split('@').nth(1) {
                products.insert(product.to_string());
            }
        }
    }
    products.into_iter().collect()
}

/// First `limit` characters of `text`.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}
