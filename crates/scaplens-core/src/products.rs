//! Product discovery over `products/<id>/product.yml`.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Lookup;
use crate::repo::{self, ContentRepo};
use crate::rules::shape;
use crate::types::{ProductDetails, ProductSummary};

/// Benchmark root assumed when `product.yml` does not declare one.
const DEFAULT_BENCHMARK_ROOT: &str = "linux_os/guide";

/// Product listing and lookup.
pub struct ProductCatalog<'a> {
    repo: &'a ContentRepo,
}

impl<'a> ProductCatalog<'a> {
    /// Catalog over `repo`.
    pub fn new(repo: &'a ContentRepo) -> Self {
        Self { repo }
    }

    /// Products carrying a `product.yml`, sorted by id.
    ///
    /// Directories without one are skipped silently; they are shared
    /// scaffolding, not products.
    pub fn list(&self) -> Vec<ProductSummary> {
        let products_dir = self.repo.products_root();
        if !products_dir.is_dir() {
            warn!(dir = %products_dir.display(), "products directory not found");
            return Vec::new();
        }

        let mut products = Vec::new();
        for product_dir in repo::sorted_dirs(&products_dir) {
            let Some(product_id) = repo::name_of(&product_dir) else {
                continue;
            };
            let product_yml = product_dir.join("product.yml");
            if !product_yml.is_file() {
                continue;
            }
            match load_summary(&product_id, &product_yml) {
                Lookup::Found(summary) => products.push(summary),
                Lookup::NotFound => {}
                Lookup::Malformed(detail) => {
                    warn!(
                        product_id = %product_id,
                        detail = %detail,
                        "skipping unreadable product"
                    );
                }
            }
        }
        info!(products = products.len(), "listed products");
        products
    }

    /// Details for `product_id`.
    pub fn details(&self, product_id: &str) -> Lookup<ProductDetails> {
        let product_dir = self.repo.products_root().join(product_id);
        if !product_dir.is_dir() {
            debug!(product_id, "product not found");
            return Lookup::NotFound;
        }
        let product_yml = product_dir.join("product.yml");
        if !product_yml.is_file() {
            debug!(product_id, "product.yml missing");
            return Lookup::NotFound;
        }

        let doc = match shape::read_yaml_mapping(&product_yml) {
            Ok(doc) => doc,
            Err(err) => return Lookup::Malformed(err.to_string()),
        };

        Lookup::Found(ProductDetails {
            product_id: product_id.to_string(),
            name: doc
                .get("full_name")
                .and_then(shape::scalar_string)
                .unwrap_or_else(|| product_id.to_string()),
            product_type: doc
                .get("product_type")
                .and_then(shape::scalar_string)
                .unwrap_or_else(|| "unknown".to_string()),
            version: doc.get("product_version").and_then(shape::scalar_string),
            description: doc.get("description").and_then(shape::scalar_string),
            profiles: self.profile_ids(product_id),
            benchmark_root: doc
                .get("benchmark_root")
                .and_then(shape::scalar_string)
                .unwrap_or_else(|| DEFAULT_BENCHMARK_ROOT.to_string()),
            product_dir: self.repo.relative(&product_dir),
            cpe: doc.get("cpe").and_then(shape::scalar_string),
        })
    }

    /// Sorted profile ids (file stems) for `product_id`.
    pub fn profile_ids(&self, product_id: &str) -> Vec<String> {
        let profiles_dir = self
            .repo
            .products_root()
            .join(product_id)
            .join("profiles");
        repo::sorted_files_with_ext(&profiles_dir, "profile")
            .iter()
            .filter_map(|path| repo::stem_of(path))
            .collect()
    }
}

fn load_summary(product_id: &str, path: &Path) -> Lookup<ProductSummary> {
    let doc = match shape::read_yaml_mapping(path) {
        Ok(doc) => doc,
        Err(err) => return Lookup::Malformed(err.to_string()),
    };
    Lookup::Found(ProductSummary {
        product_id: product_id.to_string(),
        name: doc
            .get("full_name")
            .and_then(shape::scalar_string)
            .unwrap_or_else(|| product_id.to_string()),
        product_type: doc
            .get("product_type")
            .and_then(shape::scalar_string)
            .unwrap_or_else(|| "unknown".to_string()),
        version: doc.get("product_version").and_then(shape::scalar_string),
        description: doc.get("description").and_then(shape::scalar_string),
    })
}
