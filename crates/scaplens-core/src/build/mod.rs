//! Read access to the externally produced `build/` tree.

mod datastream;
mod search;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use globset::{Glob, GlobMatcher};
use tracing::{debug, info, warn};

use crate::error::{DiscoveryError, DiscoveryResult, Lookup};
use crate::repo::{self, ContentRepo};
use crate::types::{DatastreamInfo, RenderSearchResult, RenderedRule};

/// Remediation type to rendered artifact extension under
/// `fixes_from_templates/`.
pub const RENDERED_REMEDIATION_TYPES: [(&str, &str); 7] = [
    ("bash", ".sh"),
    ("ansible", ".yml"),
    ("anaconda", ".anaconda"),
    ("puppet", ".pp"),
    ("ignition", ".yml"),
    ("kubernetes", ".yml"),
    ("blueprint", ".toml"),
];

/// Subdirectories whose presence marks a product build directory.
const INDICATOR_DIRS: [&str; 4] = ["guides", "ansible", "bash", "rules"];

/// Reader over the `build/<product>/` artifact trees.
///
/// The tree is produced by an external tool-chain and may be absent,
/// partial, or change between calls. Every accessor treats a missing file
/// as missing optional data, never as an error.
pub struct BuildArtifacts<'a> {
    repo: &'a ContentRepo,
}

impl<'a> BuildArtifacts<'a> {
    /// Reader over `repo`.
    pub fn new(repo: &'a ContentRepo) -> Self {
        Self { repo }
    }

    /// Products with build output, sorted.
    ///
    /// A directory counts as built when it carries at least one indicator:
    /// an `ssg-*.xml` datastream or one of the known output
    /// subdirectories. Hidden directories are skipped.
    pub fn list_built_products(&self) -> Vec<String> {
        let build_root = self.repo.build_root();
        if !build_root.is_dir() {
            warn!(dir = %build_root.display(), "build directory does not exist");
            return Vec::new();
        }

        let mut products = Vec::new();
        for dir in repo::sorted_dirs(&build_root) {
            let Some(name) = repo::name_of(&dir) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if is_product_build_dir(&dir) {
                products.push(name);
            }
        }
        info!(products = products.len(), "found built products");
        products
    }

    /// Rendered artifacts for the `(product, rule_id)` pair.
    ///
    /// Missing rule JSON means the rule was not built for the product;
    /// missing OVAL or remediation files are omitted from the record.
    pub fn rendered_rule(&self, product: &str, rule_id: &str) -> Lookup<RenderedRule> {
        let Some(product_build) = self.repo.product_build_dir(product) else {
            warn!(product, "no build directory for product");
            return Lookup::NotFound;
        };

        let rule_json = product_build.join("rules").join(format!("{rule_id}.json"));
        if !rule_json.is_file() {
            debug!(rule_id, product, "rule not present in build");
            return Lookup::NotFound;
        }

        let rendered_yaml = match read_rendered_yaml(&rule_json) {
            Ok(yaml) => yaml,
            Err(err) => {
                warn!(rule_id, product, error = %err, "rendered rule json unusable");
                return Lookup::Malformed(err.to_string());
            }
        };

        let mut rendered_oval = None;
        let oval_path = product_build
            .join("checks")
            .join("oval")
            .join(format!("{rule_id}.xml"));
        if oval_path.is_file() {
            match fs::read_to_string(&oval_path) {
                Ok(text) => rendered_oval = Some(text),
                Err(err) => debug!(rule_id, error = %err, "skipping unreadable oval"),
            }
        }

        let mut rendered_remediations = BTreeMap::new();
        for (rem_type, ext) in RENDERED_REMEDIATION_TYPES {
            let rem_file = product_build
                .join("fixes_from_templates")
                .join(rem_type)
                .join(format!("{rule_id}{ext}"));
            if !rem_file.is_file() {
                continue;
            }
            match fs::read_to_string(&rem_file) {
                Ok(text) => {
                    rendered_remediations.insert(rem_type.to_string(), text);
                }
                Err(err) => debug!(rule_id, rem_type, error = %err, "skipping unreadable remediation"),
            }
        }

        let build_dir = rule_json.parent().unwrap_or(&product_build);
        Lookup::Found(RenderedRule {
            rule_id: rule_id.to_string(),
            product: product.to_string(),
            rendered_yaml,
            rendered_oval,
            rendered_remediations,
            build_path: self.repo.relative(build_dir),
        })
    }

    /// Datastream status for `product`; always yields a record.
    pub fn datastream_info(&self, product: &str) -> DatastreamInfo {
        datastream::datastream_info(self.repo, product)
    }

    /// Case-insensitive substring search across rendered artifacts.
    ///
    /// Hits come back in traversal order and stop at `limit`.
    pub fn search_rendered_content(
        &self,
        query: &str,
        product: Option<&str>,
        limit: usize,
    ) -> Vec<RenderSearchResult> {
        let products = match product {
            Some(product) => vec![product.to_string()],
            None => self.list_built_products(),
        };
        search::search_products(self.repo, &products, query, limit)
    }
}

/// Indicator probe for a product build directory.
fn is_product_build_dir(dir: &Path) -> bool {
    if INDICATOR_DIRS.iter().any(|sub| dir.join(sub).is_dir()) {
        return true;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(Result::ok)
        .any(|entry| datastream_matcher().is_match(entry.file_name()))
}

fn datastream_matcher() -> &'static GlobMatcher {
    static MATCHER: OnceLock<GlobMatcher> = OnceLock::new();
    MATCHER.get_or_init(|| {
        Glob::new("ssg-*.xml")
            .expect("static glob pattern")
            .compile_matcher()
    })
}

/// Rendered rule JSON re-dumped as YAML text, matching the source format.
fn read_rendered_yaml(path: &Path) -> DiscoveryResult<String> {
    let text = fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| DiscoveryError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    serde_yaml::to_string(&data).map_err(|source| DiscoveryError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
