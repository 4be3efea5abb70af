//! Corpus-wide duplicate pass: cluster, then clear-then-set the flags.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::dedup::{find_duplicate_clusters, DuplicateCluster};
use crate::traits::SeoStore;
use crate::workflows::{DUPLICATES_SAMPLE, FLAG_BATCH};

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateOutcome {
    pub total_pages_checked: usize,
    pub exact_title_duplicates: usize,
    pub exact_description_duplicates: usize,
    pub flagged_pages: usize,
    pub duplicates_sample: Vec<DuplicateCluster>,
}

pub async fn check_duplicates(store: &dyn SeoStore) -> Result<DuplicateOutcome> {
    let pages = store.page_summaries().await?;
    let report = find_duplicate_clusters(&pages);

    // Clear-then-set, never additive: pages fixed since the last pass must
    // lose their flag.
    let now = Utc::now();
    let cleared = store.clear_duplicate_flags(now).await?;
    let flagged: Vec<String> = report.flagged.iter().cloned().collect();
    for chunk in flagged.chunks(FLAG_BATCH) {
        store.flag_duplicates(chunk, now).await?;
    }

    info!(
        checked = pages.len(),
        cleared,
        flagged = flagged.len(),
        title_clusters = report.title_clusters,
        description_clusters = report.description_clusters,
        "Duplicate pass complete"
    );

    Ok(DuplicateOutcome {
        total_pages_checked: pages.len(),
        exact_title_duplicates: report.title_clusters,
        exact_description_duplicates: report.description_clusters,
        flagged_pages: flagged.len(),
        duplicates_sample: report
            .clusters
            .into_iter()
            .take(DUPLICATES_SAMPLE)
            .collect(),
    })
}
