//! Datastream presence and lightweight XCCDF counting.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::repo::ContentRepo;
use crate::types::DatastreamInfo;

/// XCCDF 1.2 namespace the datastream elements are counted under.
const XCCDF_NS: &str = "http://checklists.nist.gov/xccdf/1.2";

/// Datastream status for `product`.
///
/// Checks the conventional output locations in order. An unbuilt product
/// still yields a record, with `exists: false` and the conventional path
/// filled in, so callers can tell "not built" from "no such product
/// concept" at the rule layer.
pub(crate) fn datastream_info(repo: &ContentRepo, product: &str) -> DatastreamInfo {
    let build_root = repo.build_root();
    let candidates = [
        build_root.join(format!("ssg-{product}-ds.xml")),
        build_root.join(format!("ssg-{product}-xccdf.xml")),
        build_root.join(product).join(format!("ssg-{product}-ds.xml")),
    ];

    let Some(path) = candidates.into_iter().find(|path| path.is_file()) else {
        debug!(product, "datastream not found");
        return DatastreamInfo {
            product: product.to_string(),
            datastream_path: format!("build/ssg-{product}-ds.xml"),
            file_size: 0,
            build_time: None,
            profiles_count: 0,
            rules_count: 0,
            exists: false,
        };
    };

    let (file_size, build_time) = match fs::metadata(&path) {
        Ok(meta) => (
            meta.len(),
            meta.modified().ok().map(DateTime::<Utc>::from),
        ),
        Err(_) => (0, None),
    };
    let (profiles_count, rules_count) = count_xccdf_elements(&path);

    DatastreamInfo {
        product: product.to_string(),
        datastream_path: repo.relative(&path),
        file_size,
        build_time,
        profiles_count,
        rules_count,
        exists: true,
    }
}

/// Best-effort `Profile` and `Rule` element counts; zeros when the XML is
/// unusable.
fn count_xccdf_elements(path: &Path) -> (usize, usize) {
    let Ok(text) = fs::read_to_string(path) else {
        return (0, 0);
    };
    let doc = match roxmltree::Document::parse(&text) {
        Ok(doc) => doc,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "failed to parse datastream xml");
            return (0, 0);
        }
    };

    let profiles = doc
        .descendants()
        .filter(|node| node.has_tag_name((XCCDF_NS, "Profile")))
        .count();
    let rules = doc
        .descendants()
        .filter(|node| node.has_tag_name((XCCDF_NS, "Rule")))
        .count();
    (profiles, rules)
}
