//! One module per bot action. Each workflow is a stateless batch job over
//! the `SeoStore` seam: it absorbs per-batch failures, counts them, and
//! only aborts on errors that make the whole action meaningless.

pub mod audit;
pub mod duplicates;
pub mod generate;
pub mod rollback;
pub mod similar;

use anyhow::Result;

use seobot_store::{AuditRun, PageStats};

use crate::traits::SeoStore;

/// Persistence chunk size for page upserts and history inserts.
pub const UPSERT_BATCH: usize = 500;
/// Chunk size for duplicate-flag updates.
pub const FLAG_BATCH: usize = 500;
/// At most this many error messages are kept per run.
pub const ERROR_SAMPLE: usize = 10;
/// Cluster sample size returned by the duplicate pass.
pub const DUPLICATES_SAMPLE: usize = 20;
/// History entries shown in a rollback preview.
pub const PREVIEW_SAMPLE: usize = 5;
/// Runs returned by `recent_runs`.
pub const RUNS_LIMIT: i64 = 20;

/// Lightweight corpus stats for the default action.
pub async fn corpus_stats(store: &dyn SeoStore) -> Result<PageStats> {
    store.page_stats().await
}

/// The most recent audit runs.
pub async fn recent_runs(store: &dyn SeoStore) -> Result<Vec<AuditRun>> {
    store.recent_runs(RUNS_LIMIT).await
}
