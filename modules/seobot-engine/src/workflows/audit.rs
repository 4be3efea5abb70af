//! Read-only corpus audit: no mutation, just counters and the health score.

use anyhow::Result;

use crate::report::{audit_pages, AuditReport};
use crate::traits::SeoStore;

pub async fn audit(store: &dyn SeoStore) -> Result<AuditReport> {
    let pages = store.page_summaries().await?;
    Ok(audit_pages(&pages))
}
