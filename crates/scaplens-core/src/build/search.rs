//! Substring search across rendered build artifacts.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::repo::{self, ContentRepo};
use crate::types::RenderSearchResult;

/// Characters of context kept on each side of a match.
const CONTEXT_CHARS: usize = 100;

/// Extensions treated as searchable text under `fixes_from_templates/`.
const TEXT_EXTENSIONS: [&str; 6] = ["sh", "yml", "yaml", "pp", "toml", "anaconda"];

/// Search the rendered artifacts of `products` for `query`, stopping as
/// soon as `limit` hits are collected.
///
/// Per product the order is rendered rule JSON, then remediation scripts,
/// then OVAL checks. Unreadable files are skipped.
pub(crate) fn search_products(
    repo_ctx: &ContentRepo,
    products: &[String],
    query: &str,
    limit: usize,
) -> Vec<RenderSearchResult> {
    let query_lower = query.to_lowercase();
    let mut results = Vec::new();

    for product in products {
        let Some(product_build) = repo_ctx.product_build_dir(product) else {
            continue;
        };

        for file in repo::sorted_files_with_ext(&product_build.join("rules"), "json") {
            if let Some(hit) = match_in_file(repo_ctx, &file, product, "rule_json", &query_lower) {
                results.push(hit);
                if results.len() >= limit {
                    return results;
                }
            }
        }

        let fixes_dir = product_build.join("fixes_from_templates");
        if fixes_dir.is_dir() {
            for entry in WalkDir::new(&fixes_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if !path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext))
                {
                    continue;
                }
                let rem_type = path
                    .parent()
                    .and_then(repo::name_of)
                    .unwrap_or_default();
                let match_type = format!("remediation_{rem_type}");
                if let Some(hit) = match_in_file(repo_ctx, path, product, &match_type, &query_lower)
                {
                    results.push(hit);
                    if results.len() >= limit {
                        return results;
                    }
                }
            }
        }

        let oval_dir = product_build.join("checks").join("oval");
        for file in repo::sorted_files_with_ext(&oval_dir, "xml") {
            if let Some(hit) = match_in_file(repo_ctx, &file, product, "oval", &query_lower) {
                results.push(hit);
                if results.len() >= limit {
                    return results;
                }
            }
        }
    }

    info!(matches = results.len(), "searched rendered content");
    results
}

fn match_in_file(
    repo_ctx: &ContentRepo,
    path: &Path,
    product: &str,
    match_type: &str,
    query_lower: &str,
) -> Option<RenderSearchResult> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping unsearchable file");
            return None;
        }
    };
    if !content.to_lowercase().contains(query_lower) {
        return None;
    }

    Some(RenderSearchResult {
        rule_id: repo::stem_of(path).unwrap_or_default(),
        product: product.to_string(),
        match_type: match_type.to_string(),
        match_snippet: extract_snippet(&content, query_lower, CONTEXT_CHARS),
        file_path: repo_ctx.relative(path),
    })
}

/// Character window around the first occurrence of `query_lower`,
/// `...`-marked on each truncated side.
///
/// Offsets are computed in characters, so multi-byte content never splits
/// mid-character.
pub(crate) fn extract_snippet(content: &str, query_lower: &str, context_chars: usize) -> String {
    let lowered = content.to_lowercase();
    let Some(byte_pos) = lowered.find(query_lower) else {
        return String::new();
    };

    let match_start = lowered[..byte_pos].chars().count();
    let match_chars = query_lower.chars().count();
    let total_chars = content.chars().count();

    let start = match_start.saturating_sub(context_chars).min(total_chars);
    let end = (match_start + match_chars + context_chars).min(total_chars);

    let mut snippet: String = content
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect();
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < total_chars {
        snippet.push_str("...");
    }
    snippet
}
