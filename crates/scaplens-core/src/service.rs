//! Public discovery facade over one content repository.

use std::path::PathBuf;

use tracing::warn;

use crate::build::BuildArtifacts;
use crate::controls;
use crate::error::{DiscoveryResult, Lookup};
use crate::index::RuleIndex;
use crate::products::ProductCatalog;
use crate::profiles::ProfileCatalog;
use crate::render;
use crate::repo::ContentRepo;
use crate::rules::RuleLoader;
use crate::search::{self, RuleQuery};
use crate::types::{
    DatastreamInfo, DetailLevel, ProductDetails, ProductSummary, ProfileDetails, ProfileSummary,
    RenderSearchResult, RenderedRule, RuleDetails, RuleSearchResult,
};

/// Options for a rule-detail lookup.
#[derive(Debug, Clone)]
pub struct RuleDetailOptions {
    /// Attach rendered build content when builds exist.
    pub include_rendered: bool,
    /// Restrict rendered content to one product.
    pub product: Option<String>,
    /// How much rendered content to include.
    pub rendered_detail: DetailLevel,
}

impl Default for RuleDetailOptions {
    fn default() -> Self {
        Self {
            include_rendered: true,
            product: None,
            rendered_detail: DetailLevel::Metadata,
        }
    }
}

/// One repository's discovery surface.
///
/// Owns the repository context and the shared rule index; everything else
/// is read through on demand. Failure policy: not-found comes back as
/// `None`, environment gaps as empty collections, and malformed files are
/// logged and folded into the same shapes. Nothing here returns an error
/// once the repository is open.
pub struct ContentDiscovery {
    repo: ContentRepo,
    index: RuleIndex,
}

impl ContentDiscovery {
    /// Open the repository at `root`.
    pub fn open(root: impl Into<PathBuf>) -> DiscoveryResult<Self> {
        Ok(Self::new(ContentRepo::open(root)?))
    }

    /// Wrap an already opened repository context.
    pub fn new(repo: ContentRepo) -> Self {
        let index = RuleIndex::new(repo.clone());
        Self { repo, index }
    }

    /// The repository this instance reads.
    pub fn repo(&self) -> &ContentRepo {
        &self.repo
    }

    /// Search rules by free text, product, and severity.
    pub fn search_rules(&self, query: &RuleQuery) -> Vec<RuleSearchResult> {
        search::search_rules(&self.repo, &self.index, query)
    }

    /// Full details for one rule; `None` when missing or unusable.
    pub fn get_rule_details(&self, rule_id: &str, options: &RuleDetailOptions) -> Option<RuleDetails> {
        let loader = RuleLoader::new(&self.repo, &self.index);
        let mut details = match loader.load_details(rule_id) {
            Lookup::Found(details) => details,
            Lookup::NotFound => {
                warn!(rule_id, "rule not found");
                return None;
            }
            Lookup::Malformed(detail) => {
                warn!(rule_id, detail = %detail, "rule unusable, answering not found");
                return None;
            }
        };

        if options.include_rendered {
            details.rendered = render::rendered_for_rule(
                &self.repo,
                rule_id,
                options.product.as_deref(),
                options.rendered_detail,
            );
        }
        Some(details)
    }

    /// Profiles for one product, or for all products.
    pub fn list_profiles(&self, product: Option<&str>) -> Vec<ProfileSummary> {
        ProfileCatalog::new(&self.repo).list(product)
    }

    /// Details for one `(profile_id, product)` pair.
    pub fn get_profile_details(&self, profile_id: &str, product: &str) -> Option<ProfileDetails> {
        match ProfileCatalog::new(&self.repo).details(profile_id, product) {
            Lookup::Found(details) => Some(details),
            Lookup::NotFound => None,
            Lookup::Malformed(detail) => {
                warn!(profile_id, product, detail = %detail, "profile unusable, answering not found");
                None
            }
        }
    }

    /// Products with build output.
    pub fn list_built_products(&self) -> Vec<String> {
        BuildArtifacts::new(&self.repo).list_built_products()
    }

    /// Raw rendered artifacts for one `(product, rule_id)` pair.
    pub fn get_rendered_rule(&self, product: &str, rule_id: &str) -> Option<RenderedRule> {
        match BuildArtifacts::new(&self.repo).rendered_rule(product, rule_id) {
            Lookup::Found(rule) => Some(rule),
            Lookup::NotFound => None,
            Lookup::Malformed(detail) => {
                warn!(product, rule_id, detail = %detail, "rendered rule unusable, answering not found");
                None
            }
        }
    }

    /// Datastream status for `product`; always returns a record.
    pub fn get_datastream_info(&self, product: &str) -> DatastreamInfo {
        BuildArtifacts::new(&self.repo).datastream_info(product)
    }

    /// Search rendered artifacts for a substring.
    pub fn search_rendered_content(
        &self,
        query: &str,
        product: Option<&str>,
        limit: usize,
    ) -> Vec<RenderSearchResult> {
        BuildArtifacts::new(&self.repo).search_rendered_content(query, product, limit)
    }

    /// All products, sorted by id.
    pub fn list_products(&self) -> Vec<ProductSummary> {
        ProductCatalog::new(&self.repo).list()
    }

    /// Details for one product.
    pub fn get_product_details(&self, product_id: &str) -> Option<ProductDetails> {
        match ProductCatalog::new(&self.repo).details(product_id) {
            Lookup::Found(details) => Some(details),
            Lookup::NotFound => None,
            Lookup::Malformed(detail) => {
                warn!(product_id, detail = %detail, "product unusable, answering not found");
                None
            }
        }
    }

    /// Control framework names.
    pub fn list_controls(&self) -> Vec<String> {
        controls::list_controls(&self.repo)
    }

    /// Scan the tree again and swap in a fresh rule index; returns the
    /// indexed rule count.
    pub fn rebuild_index(&self) -> usize {
        self.index.rebuild().len()
    }
}
