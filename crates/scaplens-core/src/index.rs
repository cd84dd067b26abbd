//! Lazily built rule-id to source-path index.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::repo::{ContentRepo, RULE_FILENAME, RULE_SEARCH_ROOTS};

/// Immutable view of a built index.
pub type IndexSnapshot = Arc<BTreeMap<String, PathBuf>>;

/// Process-lifetime mapping from rule id to its `rule.yml` path.
///
/// Built on first use and kept until an explicit [`rebuild`](Self::rebuild).
/// Readers share the current snapshot; a rebuild scans into a fresh map
/// and swaps it in, so a lookup racing a rebuild sees either the old or
/// the new index, never a partial one.
pub struct RuleIndex {
    repo: ContentRepo,
    built: RwLock<Option<IndexSnapshot>>,
}

impl RuleIndex {
    /// Create an unbuilt index over `repo`.
    pub fn new(repo: ContentRepo) -> Self {
        Self {
            repo,
            built: RwLock::new(None),
        }
    }

    /// The current snapshot, building it on first use.
    pub fn snapshot(&self) -> IndexSnapshot {
        {
            let guard = self.built.read().unwrap();
            if let Some(map) = guard.as_ref() {
                return Arc::clone(map);
            }
        }

        let mut guard = self.built.write().unwrap();
        // Another thread may have built while we waited for the write lock.
        if let Some(map) = guard.as_ref() {
            return Arc::clone(map);
        }
        let fresh = Arc::new(scan_rules(&self.repo));
        *guard = Some(Arc::clone(&fresh));
        fresh
    }

    /// Scan again and swap in the fresh index.
    pub fn rebuild(&self) -> IndexSnapshot {
        let fresh = Arc::new(scan_rules(&self.repo));
        let mut guard = self.built.write().unwrap();
        *guard = Some(Arc::clone(&fresh));
        fresh
    }

    /// Source path for `rule_id`, if indexed.
    pub fn lookup(&self, rule_id: &str) -> Option<PathBuf> {
        self.snapshot().get(rule_id).cloned()
    }

    /// Number of indexed rules, building the index on first use.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// True when no rules were indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walk the fixed search roots for `rule.yml` files.
///
/// The rule id is the directory name holding the file. A missing search
/// root is skipped; an id seen twice keeps the later occurrence.
fn scan_rules(repo: &ContentRepo) -> BTreeMap<String, PathBuf> {
    info!(root = %repo.root().display(), "building rule index");
    let mut rules: BTreeMap<String, PathBuf> = BTreeMap::new();

    for search_root in RULE_SEARCH_ROOTS {
        let base = repo.root().join(search_root);
        if !base.is_dir() {
            debug!(search_root, "search root absent, skipping");
            continue;
        }

        for entry in WalkDir::new(&base).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() || entry.file_name() != RULE_FILENAME {
                continue;
            }
            let Some(rule_id) = entry
                .path()
                .parent()
                .and_then(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().into_owned())
            else {
                continue;
            };
            if let Some(replaced) = rules.insert(rule_id.clone(), entry.into_path()) {
                warn!(
                    rule_id = %rule_id,
                    replaced = %replaced.display(),
                    "duplicate rule id, keeping the later occurrence"
                );
            }
        }
    }

    info!(rules = rules.len(), "rule index built");
    rules
}
