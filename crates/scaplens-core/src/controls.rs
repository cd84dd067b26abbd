//! Control framework discovery over `controls/*.yml`.

use tracing::info;

use crate::repo::{self, ContentRepo};

/// Control framework names (file stems), sorted; empty when the
/// `controls/` tree is absent.
pub(crate) fn list_controls(repo_ctx: &ContentRepo) -> Vec<String> {
    let controls_dir = repo_ctx.controls_root();
    if !controls_dir.is_dir() {
        return Vec::new();
    }
    let controls: Vec<String> = repo::sorted_files_with_ext(&controls_dir, "yml")
        .iter()
        .filter_map(|path| repo::stem_of(path))
        .collect();
    info!(controls = controls.len(), "listed control frameworks");
    controls
}
