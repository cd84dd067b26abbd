//! Free-text rule search over the index.

use tracing::{debug, info};

use crate::error::Lookup;
use crate::index::RuleIndex;
use crate::repo::ContentRepo;
use crate::rules::RuleLoader;
use crate::types::RuleSearchResult;

/// Default cap on search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Rule search parameters.
///
/// All criteria are optional and AND-combined; an empty query matches
/// every rule, leaving only the filters.
#[derive(Debug, Clone)]
pub struct RuleQuery {
    /// Free text matched case-insensitively against rule id, then against
    /// title and description together.
    pub query: Option<String>,
    /// Exact product filter against the inferred product list.
    pub product: Option<String>,
    /// Exact severity filter, compared against the stored string.
    pub severity: Option<String>,
    /// Result cap.
    pub limit: usize,
}

impl Default for RuleQuery {
    fn default() -> Self {
        Self {
            query: None,
            product: None,
            severity: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Scan the index and collect up to `query.limit` matching rules.
///
/// Rules whose YAML cannot be loaded are skipped, so one bad file never
/// empties a search.
pub(crate) fn search_rules(
    repo: &ContentRepo,
    index: &RuleIndex,
    query: &RuleQuery,
) -> Vec<RuleSearchResult> {
    debug!(?query, "searching rules");
    let loader = RuleLoader::new(repo, index);
    let snapshot = index.snapshot();
    let needle = query.query.as_deref().map(str::to_lowercase);

    let mut results = Vec::new();
    for (rule_id, path) in snapshot.iter() {
        let Lookup::Found(candidate) = loader.load_search_result(rule_id, path) else {
            continue;
        };

        if let Some(needle) = needle.as_deref() {
            let id_match = rule_id.to_lowercase().contains(needle);
            let text_match = || {
                format!("{} {}", candidate.title, candidate.description)
                    .to_lowercase()
                    .contains(needle)
            };
            if !id_match && !text_match() {
                continue;
            }
        }
        if !matches_filters(&candidate, query) {
            continue;
        }

        results.push(candidate);
        if results.len() >= query.limit {
            break;
        }
    }

    info!(matches = results.len(), "rule search finished");
    results
}

/// Product and severity filters, applied after the text match.
fn matches_filters(candidate: &RuleSearchResult, query: &RuleQuery) -> bool {
    if let Some(product) = query.product.as_deref() {
        if !candidate.products.iter().any(|p| p == product) {
            return false;
        }
    }
    if let Some(severity) = query.severity.as_deref() {
        if candidate.severity.as_str() != severity {
            return false;
        }
    }
    true
}
