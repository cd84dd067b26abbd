//! Merging rendered build content into rule detail records.

use std::collections::BTreeMap;

use tracing::debug;

use crate::build::BuildArtifacts;
use crate::error::Lookup;
use crate::repo::ContentRepo;
use crate::types::{DetailLevel, RenderedContent};

/// Per-product rendered content summaries for one rule.
///
/// Sizes and availability are computed at every detail level; under
/// [`DetailLevel::Metadata`] the textual fields are nulled before the
/// entry is included, so metadata answers stay small. `None` means no
/// built product had content for the rule, which callers surface as
/// "nothing rendered" rather than an error.
pub(crate) fn rendered_for_rule(
    repo: &ContentRepo,
    rule_id: &str,
    product_filter: Option<&str>,
    detail: DetailLevel,
) -> Option<BTreeMap<String, RenderedContent>> {
    let artifacts = BuildArtifacts::new(repo);

    let mut products = artifacts.list_built_products();
    if let Some(filter) = product_filter {
        products.retain(|product| product == filter);
    }
    if products.is_empty() {
        debug!(rule_id, "no built products to merge");
        return None;
    }

    let mut rendered = BTreeMap::new();
    for product in &products {
        // A product whose artifacts are missing or unusable loses only
        // its own entry.
        let Lookup::Found(rule) = artifacts.rendered_rule(product, rule_id) else {
            continue;
        };

        let build_time = artifacts.datastream_info(product).build_time;

        let yaml_size = rule.rendered_yaml.chars().count();
        let oval_size = rule
            .rendered_oval
            .as_deref()
            .map_or(0, |oval| oval.chars().count());
        let remediation_sizes: BTreeMap<String, usize> = rule
            .rendered_remediations
            .iter()
            .map(|(rem_type, text)| (rem_type.clone(), text.chars().count()))
            .collect();
        let available_remediations: Vec<String> =
            rule.rendered_remediations.keys().cloned().collect();
        let has_oval = rule.rendered_oval.is_some();

        let mut entry = RenderedContent {
            product: product.clone(),
            rendered_yaml: Some(rule.rendered_yaml),
            rendered_oval: rule.rendered_oval,
            rendered_remediations: rule.rendered_remediations,
            build_path: rule.build_path,
            build_time,
            yaml_size,
            oval_size,
            remediation_sizes,
            has_yaml: true,
            has_oval,
            available_remediations,
        };
        if detail == DetailLevel::Metadata {
            entry.rendered_yaml = None;
            entry.rendered_oval = None;
            entry.rendered_remediations = BTreeMap::new();
        }
        rendered.insert(product.clone(), entry);
    }

    if rendered.is_empty() {
        debug!(rule_id, "no rendered content found");
        None
    } else {
        Some(rendered)
    }
}
