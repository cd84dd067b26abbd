//! Discovery core for ComplianceAsCode-style content repositories.
//!
//! A content checkout mixes loosely-shaped `rule.yml` sources, profile
//! files in a custom line grammar, per-product metadata, and a `build/`
//! tree of rendered artifacts written by an external tool-chain. This
//! crate indexes and queries all of them behind one facade.
//!
//! # Design
//!
//! - **Explicit context.** [`ContentRepo`] pins one repository root and is
//!   handed to every component, so independent checkouts can coexist in a
//!   single process.
//! - **Lazy shared index.** [`RuleIndex`](index::RuleIndex) maps rule ids
//!   to source paths, built on first use and rebuilt only on demand.
//!   Everything else re-reads the tree per call.
//! - **Degrade, never fail.** Missing files answer as `None` or empty
//!   collections; malformed files are logged through `tracing` and folded
//!   into the same shapes. Hosts shipping answers over a wire never see an
//!   error from the query surface.
//!
//! # Quick Start
//!
//! ```no_run
//! use scaplens_core::{ContentDiscovery, RuleQuery};
//!
//! # fn example() -> anyhow::Result<()> {
//! let discovery = ContentDiscovery::open("/srv/content")?;
//!
//! for hit in discovery.search_rules(&RuleQuery {
//!     query: Some("ssh".into()),
//!     ..RuleQuery::default()
//! }) {
//!     println!("{} [{}] {}", hit.rule_id, hit.severity.as_str(), hit.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod build;
mod controls;
pub mod error;
pub mod index;
pub mod products;
pub mod profiles;
mod render;
pub mod repo;
pub mod rules;
pub mod search;
pub mod service;
pub mod types;

// Re-export main types
pub use build::BuildArtifacts;
pub use error::{DiscoveryError, DiscoveryResult, Lookup};
pub use index::RuleIndex;
pub use products::ProductCatalog;
pub use profiles::ProfileCatalog;
pub use repo::ContentRepo;
pub use rules::RuleLoader;
pub use search::{RuleQuery, DEFAULT_SEARCH_LIMIT};
pub use service::{ContentDiscovery, RuleDetailOptions};
pub use types::{
    DatastreamInfo, DetailLevel, Identifiers, ProductDetails, ProductSummary, ProfileDetails,
    ProfileSummary, References, RenderSearchResult, RenderedContent, RenderedRule, RuleDetails,
    RuleSearchResult, Severity,
};
