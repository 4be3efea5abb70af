//! Full metadata generation: enumerate the page space, synthesize every
//! page, upsert in chunks, record history, track the run.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use seobot_common::BotSettings;
use seobot_store::{NewHistoryEntry, NewPage, RunCompletion};

use crate::pagespace::{Breakdown, PageSpace};
use crate::synth::{metadata_hash, synthesize};
use crate::traits::SeoStore;
use crate::workflows::{ERROR_SAMPLE, UPSERT_BATCH};

const RUN_TYPE: &str = "metadata_full";
const CHANGE_REASON: &str = "Full SEO audit - automated metadata generation";

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutcome {
    pub total_pages: usize,
    pub processed_pages: usize,
    pub fixed_pages: usize,
    pub error_count: usize,
    pub duplicate_titles_found: usize,
    pub batch_id: String,
    pub run_id: Option<Uuid>,
    pub breakdown: Breakdown,
    #[serde(skip)]
    pub errors: Vec<String>,
    #[serde(skip)]
    pub history_recorded: bool,
}

pub async fn generate_metadata(
    store: &dyn SeoStore,
    settings: &BotSettings,
    base_url: &str,
    actor: &str,
) -> Result<GenerateOutcome> {
    // A missing run record is not worth aborting a whole generation for.
    let run_id = match store.create_run(RUN_TYPE, actor).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "Failed to create run record, continuing without one");
            None
        }
    };

    let batch_id = format!("batch_{}", Utc::now().timestamp_millis());
    info!(batch_id = batch_id.as_str(), "Starting full metadata generation");

    let entities = store.load_entities().await?;
    let space = PageSpace::new(entities);
    let breakdown = space.expected_counts();
    let total_pages = breakdown.total();

    let record_history = total_pages <= settings.history_skip_threshold;
    if !record_history {
        info!(
            total_pages,
            threshold = settings.history_skip_threshold,
            "History recording skipped for oversized run"
        );
    }

    let now = Utc::now();
    let mut processed_pages = 0usize;
    let mut fixed_pages = 0usize;
    let mut error_count = 0usize;
    let mut errors: Vec<String> = Vec::new();
    let mut title_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut page_batch: Vec<NewPage> = Vec::with_capacity(UPSERT_BATCH);
    let mut history_batch: Vec<NewHistoryEntry> = Vec::with_capacity(UPSERT_BATCH);

    for seed in space.seeds() {
        let meta = synthesize(seed.page_type, &seed.ctx);
        let hash = metadata_hash(&meta.title, &meta.description, &meta.h1);

        *title_counts.entry(meta.title.to_lowercase()).or_default() += 1;

        page_batch.push(NewPage {
            slug: seed.slug.clone(),
            page_type: seed.page_type.as_str().to_string(),
            title: seed.ctx.name.clone(),
            meta_title: meta.title.clone(),
            meta_description: meta.description.clone(),
            h1: meta.h1.clone(),
            og_title: meta.title.clone(),
            og_description: meta.description.clone(),
            canonical_url: format!("{base_url}{}", seed.slug),
            metadata_hash: hash,
            is_indexed: true,
            last_generated_at: now,
            updated_at: now,
        });
        if record_history {
            history_batch.push(NewHistoryEntry {
                slug: seed.slug,
                new_title: meta.title,
                new_meta_description: meta.description,
                new_h1: meta.h1,
                change_reason: CHANGE_REASON.to_string(),
                changed_by: actor.to_string(),
                batch_id: batch_id.clone(),
            });
        }
        processed_pages += 1;

        if page_batch.len() >= UPSERT_BATCH {
            flush_pages(
                store,
                &mut page_batch,
                &mut fixed_pages,
                &mut error_count,
                &mut errors,
            )
            .await;
        }
        if history_batch.len() >= UPSERT_BATCH {
            flush_history(store, &mut history_batch).await;
        }
    }
    flush_pages(
        store,
        &mut page_batch,
        &mut fixed_pages,
        &mut error_count,
        &mut errors,
    )
    .await;
    flush_history(store, &mut history_batch).await;

    let duplicated: Vec<(&String, &u32)> =
        title_counts.iter().filter(|(_, count)| **count > 1).collect();
    let duplicate_titles_found = duplicated.len();
    let duplicates_sample: Vec<String> = duplicated
        .iter()
        .take(5)
        .map(|(title, count)| {
            let prefix: String = title.chars().take(50).collect();
            format!("\"{prefix}...\" used by {count} pages")
        })
        .collect();

    if let Some(run_id) = run_id {
        let mut summary = match serde_json::to_value(&breakdown) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        summary.insert(
            "duplicate_titles_found".into(),
            serde_json::json!(duplicate_titles_found),
        );
        summary.insert("duplicates_sample".into(), serde_json::json!(duplicates_sample));

        let completion = RunCompletion {
            total_pages: total_pages as i32,
            processed_pages: processed_pages as i32,
            fixed_pages: fixed_pages as i32,
            error_count: error_count as i32,
            errors: errors.clone(),
            summary: serde_json::Value::Object(summary),
        };
        if let Err(e) = store.complete_run(run_id, completion).await {
            warn!(run_id = %run_id, error = %e, "Failed to finalize run record");
        }
    }

    info!(
        total_pages,
        fixed_pages, error_count, duplicate_titles_found, "Metadata generation complete"
    );

    Ok(GenerateOutcome {
        total_pages,
        processed_pages,
        fixed_pages,
        error_count,
        duplicate_titles_found,
        batch_id,
        run_id,
        breakdown,
        errors,
        history_recorded: record_history,
    })
}

/// Upsert one chunk. A failed chunk is tallied, not fatal: the remaining
/// chunks still run and the run completes with its error count.
async fn flush_pages(
    store: &dyn SeoStore,
    batch: &mut Vec<NewPage>,
    fixed_pages: &mut usize,
    error_count: &mut usize,
    errors: &mut Vec<String>,
) {
    if batch.is_empty() {
        return;
    }
    match store.upsert_pages(batch).await {
        Ok(_) => *fixed_pages += batch.len(),
        Err(e) => {
            warn!(pages = batch.len(), error = %e, "Page upsert batch failed, continuing");
            *error_count += 1;
            if errors.len() < ERROR_SAMPLE {
                errors.push(e.to_string());
            }
        }
    }
    batch.clear();
}

/// History is best-effort: losing a changelog chunk must not fail the
/// metadata write.
async fn flush_history(store: &dyn SeoStore, batch: &mut Vec<NewHistoryEntry>) {
    if batch.is_empty() {
        return;
    }
    if let Err(e) = store.insert_history(batch).await {
        warn!(entries = batch.len(), error = %e, "History insert batch failed");
    }
    batch.clear();
}
