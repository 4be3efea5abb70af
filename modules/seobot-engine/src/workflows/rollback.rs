//! Rollback: a read-only preview of matching history, and a separate
//! explicit apply step that writes old values back onto pages.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use seobot_common::SeoBotError;
use seobot_store::{HistoryEntry, NewHistoryEntry};

use crate::synth::metadata_hash;
use crate::traits::SeoStore;
use crate::workflows::PREVIEW_SAMPLE;

const RESTORE_REASON: &str = "Rollback - restored from history";

#[derive(Debug, Clone, Serialize)]
pub struct RollbackSample {
    pub slug: String,
    pub changed_at: DateTime<Utc>,
    pub batch_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollbackPreview {
    pub records_found: usize,
    pub sample: Vec<RollbackSample>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollbackApplied {
    pub pages_restored: usize,
    pub pages_missing: usize,
    /// Pages regenerated after the history entry being restored. They are
    /// still overwritten (latest request wins), but the caller should know.
    pub overwrote_newer: usize,
    pub error_count: usize,
    pub batch_id: String,
}

/// Look up matching history, enforcing the action's input contract.
async fn lookup(
    store: &dyn SeoStore,
    batch_id: Option<&str>,
    slug: Option<&str>,
) -> Result<Vec<HistoryEntry>> {
    if batch_id.is_none() && slug.is_none() {
        return Err(SeoBotError::Validation("batch_id or slug required".into()).into());
    }
    let entries = store.find_history(batch_id, slug).await?;
    if entries.is_empty() {
        return Err(SeoBotError::NotFound("No history found".into()).into());
    }
    Ok(entries)
}

/// Preview the history a rollback would restore. Never mutates pages.
pub async fn preview(
    store: &dyn SeoStore,
    batch_id: Option<&str>,
    slug: Option<&str>,
) -> Result<RollbackPreview> {
    let entries = lookup(store, batch_id, slug).await?;
    Ok(RollbackPreview {
        records_found: entries.len(),
        sample: entries
            .iter()
            .take(PREVIEW_SAMPLE)
            .map(|entry| RollbackSample {
                slug: entry.slug.clone(),
                changed_at: entry.created_at,
                batch_id: entry.batch_id.clone(),
            })
            .collect(),
        message: "Rollback preview only; run rollback_apply to restore these values".into(),
    })
}

/// Write matching history values back onto their pages. The newest entry
/// per slug wins; the restore itself is recorded as a new history batch so
/// it can in turn be rolled back.
pub async fn apply(
    store: &dyn SeoStore,
    batch_id: Option<&str>,
    slug: Option<&str>,
    actor: &str,
) -> Result<RollbackApplied> {
    let entries = lookup(store, batch_id, slug).await?;

    // Entries are newest-first; keep the first occurrence per slug.
    let mut chosen: Vec<&HistoryEntry> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in &entries {
        if seen.insert(entry.slug.as_str()) {
            chosen.push(entry);
        }
    }

    let slugs: Vec<String> = chosen.iter().map(|entry| entry.slug.clone()).collect();
    let generated_at: HashMap<String, Option<DateTime<Utc>>> = store
        .pages_by_slugs(&slugs)
        .await?
        .into_iter()
        .map(|page| (page.slug, page.last_generated_at))
        .collect();

    let now = Utc::now();
    // Separate namespace from generation batches, so a restore can never
    // collide with the batch it is restoring from.
    let restore_batch_id = format!("rollback_{}", now.timestamp_millis());
    let mut pages_restored = 0usize;
    let mut pages_missing = 0usize;
    let mut overwrote_newer = 0usize;
    let mut error_count = 0usize;
    let mut restore_history: Vec<NewHistoryEntry> = Vec::new();

    for entry in &chosen {
        let hash = metadata_hash(&entry.new_title, &entry.new_meta_description, &entry.new_h1);
        match store
            .restore_metadata(
                &entry.slug,
                &entry.new_title,
                &entry.new_meta_description,
                &entry.new_h1,
                &hash,
                now,
            )
            .await
        {
            Ok(0) => pages_missing += 1,
            Ok(_) => {
                pages_restored += 1;
                let regenerated_since = generated_at
                    .get(&entry.slug)
                    .and_then(|stamp| *stamp)
                    .is_some_and(|stamp| stamp > entry.created_at);
                if regenerated_since {
                    overwrote_newer += 1;
                }
                restore_history.push(NewHistoryEntry {
                    slug: entry.slug.clone(),
                    new_title: entry.new_title.clone(),
                    new_meta_description: entry.new_meta_description.clone(),
                    new_h1: entry.new_h1.clone(),
                    change_reason: RESTORE_REASON.to_string(),
                    changed_by: actor.to_string(),
                    batch_id: restore_batch_id.clone(),
                });
            }
            Err(e) => {
                warn!(slug = entry.slug.as_str(), error = %e, "Restore failed, continuing");
                error_count += 1;
            }
        }
    }

    if !restore_history.is_empty() {
        if let Err(e) = store.insert_history(&restore_history).await {
            warn!(entries = restore_history.len(), error = %e, "Restore history insert failed");
        }
    }

    info!(
        pages_restored,
        pages_missing, overwrote_newer, error_count, "Rollback applied"
    );

    Ok(RollbackApplied {
        pages_restored,
        pages_missing,
        overwrote_newer,
        error_count,
        batch_id: restore_batch_id,
    })
}
