//! Profile discovery: listings and per-profile details.

pub mod format;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Lookup;
use crate::repo::{self, ContentRepo};
use crate::rules::shape;
use crate::types::{ProfileDetails, ProfileSummary};

use format::parse_profile;

const SUMMARY_DESCRIPTION_CHARS: usize = 200;

/// Profile listing and lookup over `products/<id>/profiles/*.profile`.
pub struct ProfileCatalog<'a> {
    repo: &'a ContentRepo,
}

impl<'a> ProfileCatalog<'a> {
    /// Catalog over `repo`.
    pub fn new(repo: &'a ContentRepo) -> Self {
        Self { repo }
    }

    /// Profiles for one product, or for all products, sorted by
    /// `(product, profile_id)`.
    pub fn list(&self, product: Option<&str>) -> Vec<ProfileSummary> {
        let products_dir = self.repo.products_root();
        if !products_dir.is_dir() {
            warn!(dir = %products_dir.display(), "products directory not found");
            return Vec::new();
        }

        let product_dirs: Vec<PathBuf> = match product {
            Some(product) => vec![products_dir.join(product)],
            None => repo::sorted_dirs(&products_dir),
        };

        let mut profiles = Vec::new();
        for product_dir in product_dirs {
            if !product_dir.is_dir() {
                continue;
            }
            let Some(product_id) = repo::name_of(&product_dir) else {
                continue;
            };

            for profile_file in
                repo::sorted_files_with_ext(&product_dir.join("profiles"), "profile")
            {
                let Some(profile_id) = repo::stem_of(&profile_file) else {
                    continue;
                };
                match self.load_summary(&profile_id, &product_id, &profile_file) {
                    Lookup::Found(summary) => profiles.push(summary),
                    Lookup::NotFound => {}
                    Lookup::Malformed(detail) => {
                        warn!(
                            profile_id = %profile_id,
                            detail = %detail,
                            "skipping unreadable profile"
                        );
                    }
                }
            }
        }

        profiles.sort_by(|a, b| {
            (a.product.as_str(), a.profile_id.as_str())
                .cmp(&(b.product.as_str(), b.profile_id.as_str()))
        });
        info!(profiles = profiles.len(), "listed profiles");
        profiles
    }

    /// Details for the `(profile_id, product)` pair.
    pub fn details(&self, profile_id: &str, product: &str) -> Lookup<ProfileDetails> {
        let path = self
            .repo
            .products_root()
            .join(product)
            .join("profiles")
            .join(format!("{profile_id}.profile"));
        if !path.is_file() {
            debug!(profile_id, product, "profile not found");
            return Lookup::NotFound;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => return Lookup::Malformed(err.to_string()),
        };
        let parsed = parse_profile(&content);
        let rule_count = parsed.selections.len();

        Lookup::Found(ProfileDetails {
            profile_id: profile_id.to_string(),
            title: parsed.title.unwrap_or_else(|| profile_id.to_string()),
            description: parsed.description,
            product: product.to_string(),
            extends: parsed.extends,
            selections: parsed.selections,
            variables: parsed.variables,
            file_path: self.repo.relative(&path),
            rule_count,
            control_file: parsed.controls,
        })
    }

    fn load_summary(&self, profile_id: &str, product: &str, path: &Path) -> Lookup<ProfileSummary> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => return Lookup::Malformed(err.to_string()),
        };
        let parsed = parse_profile(&content);

        Lookup::Found(ProfileSummary {
            profile_id: profile_id.to_string(),
            title: parsed.title.unwrap_or_else(|| profile_id.to_string()),
            description: shape::truncate_chars(&parsed.description, SUMMARY_DESCRIPTION_CHARS),
            product: product.to_string(),
            rule_count: parsed.selections.len(),
        })
    }
}
