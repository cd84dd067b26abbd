//! Content repository location and layout.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DiscoveryError, DiscoveryResult};

/// Subtrees scanned for rule definitions, in scan order.
pub const RULE_SEARCH_ROOTS: [&str; 3] = ["linux_os", "applications", "shared"];

/// Filename every rule definition uses.
pub const RULE_FILENAME: &str = "rule.yml";

/// Subdirectories a full content checkout is expected to carry.
const REQUIRED_DIRS: [&str; 3] = ["ssg", "linux_os", "products"];

/// Resolved location of one content repository checkout.
///
/// An explicit context handed to every discovery component at
/// construction, so independent repositories can coexist in one process.
/// [`open`](Self::open) only checks that the root exists; the `build/`
/// tree is probed lazily because the external builder creates it out of
/// band, and its absence is a normal state.
#[derive(Debug, Clone)]
pub struct ContentRepo {
    root: PathBuf,
}

impl ContentRepo {
    /// Open the repository rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> DiscoveryResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DiscoveryError::RepoNotFound { path: root });
        }
        debug!(root = %root.display(), "opened content repository");
        Ok(Self { root })
    }

    /// Check for the subdirectories a full checkout carries.
    ///
    /// `build/` is not required; it exists only after the external builder
    /// has run.
    pub fn ensure_layout(&self) -> DiscoveryResult<()> {
        let missing: Vec<&str> = REQUIRED_DIRS
            .iter()
            .copied()
            .filter(|dir| !self.root.join(dir).is_dir())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DiscoveryError::LayoutIncomplete {
                root: self.root.clone(),
                missing: missing.join(", "),
            })
        }
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `build/` tree produced by the external tool-chain.
    pub fn build_root(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Build output directory for `product`, if it exists.
    pub fn product_build_dir(&self, product: &str) -> Option<PathBuf> {
        let dir = self.build_root().join(product);
        dir.is_dir().then_some(dir)
    }

    /// `products/` tree holding per-product metadata and profiles.
    pub fn products_root(&self) -> PathBuf {
        self.root.join("products")
    }

    /// `controls/` tree holding control framework files.
    pub fn controls_root(&self) -> PathBuf {
        self.root.join("controls")
    }

    /// `path` made relative to the repository root, for display in records.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// Immediate subdirectories of `dir`, sorted; empty when `dir` is absent.
pub(crate) fn sorted_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Files in `dir` with extension `ext`, sorted; empty when `dir` is absent.
pub(crate) fn sorted_files_with_ext(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    files
}

/// Final path component as a string.
pub(crate) fn name_of(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// File stem as a string.
pub(crate) fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}
