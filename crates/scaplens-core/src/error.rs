//! Error and lookup-outcome types for the discovery core.

use std::path::PathBuf;

/// Errors raised by internal discovery steps.
///
/// These stay inside the crate: the public facade folds single-entity
/// failures into [`Lookup`] outcomes and answers environment gaps with
/// empty collections, so callers never branch on error variants.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Repository root does not exist or is not a directory.
    #[error("content repository not found at {}", .path.display())]
    RepoNotFound { path: PathBuf },

    /// Required content subdirectories are absent from the checkout.
    #[error("repository at {} is missing required directories: {missing}", .root.display())]
    LayoutIncomplete { root: PathBuf, missing: String },

    /// Reading a file or its metadata failed.
    #[error("read failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A YAML document could not be parsed.
    #[error("yaml parse failed for {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A JSON document could not be parsed.
    #[error("json parse failed for {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A document parsed but its top level is not the expected shape.
    #[error("unexpected shape in {}: {detail}", .path.display())]
    Shape { path: PathBuf, detail: String },
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Outcome of a single-entity load.
///
/// Distinguishes "does not exist" from "exists but unusable" so callers
/// can log the difference. The facade collapses `Malformed` into the
/// not-found shape after logging; bulk operations skip the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The entity exists and parsed cleanly.
    Found(T),
    /// The entity does not exist on disk.
    NotFound,
    /// The entity exists but could not be read or parsed.
    Malformed(String),
}

impl<T> Lookup<T> {
    /// True when the entity was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The value, collapsing `NotFound` and `Malformed` to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::Malformed(_) => None,
        }
    }

    /// Map the contained value, preserving the other outcomes.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
            Self::Malformed(detail) => Lookup::Malformed(detail),
        }
    }
}
