//! In-memory `SeoStore` for workflow tests: no network, no database,
//! no Docker. `cargo test` in seconds.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use seobot_common::RunStatus;
use seobot_store::{
    AuditRun, EntitySets, HistoryEntry, NewHistoryEntry, NewPage, PageStats, PageSummary,
    RunCompletion,
};

use crate::traits::SeoStore;

/// One stored page, mirroring the seo_pages columns the engine touches.
#[derive(Debug, Clone)]
pub struct StoredPage {
    pub slug: String,
    pub page_type: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub h1: Option<String>,
    pub metadata_hash: Option<String>,
    pub is_indexed: bool,
    pub is_duplicate: bool,
    pub last_generated_at: Option<DateTime<Utc>>,
}

impl StoredPage {
    /// A well-formed page for seeding test corpora.
    pub fn new(slug: &str, page_type: &str, meta_title: &str, meta_description: &str) -> Self {
        Self {
            slug: slug.to_string(),
            page_type: page_type.to_string(),
            meta_title: Some(meta_title.to_string()),
            meta_description: Some(meta_description.to_string()),
            h1: None,
            metadata_hash: None,
            is_indexed: true,
            is_duplicate: false,
            last_generated_at: None,
        }
    }
}

#[derive(Default)]
struct Inner {
    entities: EntitySets,
    pages: BTreeMap<String, StoredPage>,
    history: Vec<HistoryEntry>,
    runs: Vec<AuditRun>,
    settings: serde_json::Map<String, serde_json::Value>,
    fail_upserts_remaining: u32,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(entities: EntitySets) -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().entities = entities;
        store
    }

    /// Seed a page directly, bypassing the upsert path.
    pub fn seed_page(&self, page: StoredPage) {
        self.inner
            .lock()
            .unwrap()
            .pages
            .insert(page.slug.clone(), page);
    }

    /// Make the next `n` upsert calls fail, for partial-batch-failure tests.
    pub fn fail_next_upserts(&self, n: u32) {
        self.inner.lock().unwrap().fail_upserts_remaining = n;
    }

    pub fn page(&self, slug: &str) -> Option<StoredPage> {
        self.inner.lock().unwrap().pages.get(slug).cloned()
    }

    pub fn page_count(&self) -> usize {
        self.inner.lock().unwrap().pages.len()
    }

    pub fn flagged_slugs(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .pages
            .values()
            .filter(|page| page.is_duplicate)
            .map(|page| page.slug.clone())
            .collect()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.inner.lock().unwrap().history.clone()
    }

    pub fn runs(&self) -> Vec<AuditRun> {
        self.inner.lock().unwrap().runs.clone()
    }
}

#[async_trait]
impl SeoStore for MemoryStore {
    async fn load_entities(&self) -> Result<EntitySets> {
        Ok(self.inner.lock().unwrap().entities.clone())
    }

    async fn upsert_pages(&self, pages: &[NewPage]) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_upserts_remaining > 0 {
            inner.fail_upserts_remaining -= 1;
            bail!("injected upsert failure");
        }
        for page in pages {
            let is_duplicate = inner
                .pages
                .get(&page.slug)
                .map(|existing| existing.is_duplicate)
                .unwrap_or(false);
            inner.pages.insert(
                page.slug.clone(),
                StoredPage {
                    slug: page.slug.clone(),
                    page_type: page.page_type.clone(),
                    meta_title: Some(page.meta_title.clone()),
                    meta_description: Some(page.meta_description.clone()),
                    h1: Some(page.h1.clone()),
                    metadata_hash: Some(page.metadata_hash.clone()),
                    is_indexed: page.is_indexed,
                    is_duplicate,
                    last_generated_at: Some(page.last_generated_at),
                },
            );
        }
        Ok(pages.len() as u64)
    }

    async fn page_summaries(&self) -> Result<Vec<PageSummary>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .pages
            .values()
            .map(|page| PageSummary {
                slug: page.slug.clone(),
                page_type: page.page_type.clone(),
                meta_title: page.meta_title.clone(),
                meta_description: page.meta_description.clone(),
                is_indexed: page.is_indexed,
                is_duplicate: page.is_duplicate,
                last_generated_at: page.last_generated_at,
            })
            .collect())
    }

    async fn pages_by_slugs(&self, slugs: &[String]) -> Result<Vec<PageSummary>> {
        let inner = self.inner.lock().unwrap();
        Ok(slugs
            .iter()
            .filter_map(|slug| inner.pages.get(slug))
            .map(|page| PageSummary {
                slug: page.slug.clone(),
                page_type: page.page_type.clone(),
                meta_title: page.meta_title.clone(),
                meta_description: page.meta_description.clone(),
                is_indexed: page.is_indexed,
                is_duplicate: page.is_duplicate,
                last_generated_at: page.last_generated_at,
            })
            .collect())
    }

    async fn clear_duplicate_flags(&self, _now: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut cleared = 0;
        for page in inner.pages.values_mut() {
            if page.is_duplicate {
                page.is_duplicate = false;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn flag_duplicates(&self, slugs: &[String], _now: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut flagged = 0;
        for slug in slugs {
            if let Some(page) = inner.pages.get_mut(slug) {
                page.is_duplicate = true;
                flagged += 1;
            }
        }
        Ok(flagged)
    }

    async fn restore_metadata(
        &self,
        slug: &str,
        meta_title: &str,
        meta_description: &str,
        h1: &str,
        metadata_hash: &str,
        _now: DateTime<Utc>,
    ) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        match inner.pages.get_mut(slug) {
            Some(page) => {
                page.meta_title = Some(meta_title.to_string());
                page.meta_description = Some(meta_description.to_string());
                page.h1 = Some(h1.to_string());
                page.metadata_hash = Some(metadata_hash.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_history(&self, entries: &[NewHistoryEntry]) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        for entry in entries {
            inner.history.push(HistoryEntry {
                id: Uuid::new_v4(),
                slug: entry.slug.clone(),
                new_title: entry.new_title.clone(),
                new_meta_description: entry.new_meta_description.clone(),
                new_h1: entry.new_h1.clone(),
                change_reason: entry.change_reason.clone(),
                changed_by: entry.changed_by.clone(),
                batch_id: entry.batch_id.clone(),
                created_at: now,
            });
        }
        Ok(entries.len() as u64)
    }

    async fn find_history(
        &self,
        batch_id: Option<&str>,
        slug: Option<&str>,
    ) -> Result<Vec<HistoryEntry>> {
        let inner = self.inner.lock().unwrap();
        // Reverse insertion order first so same-instant entries still come
        // back newest-first after the stable sort.
        let mut matches: Vec<HistoryEntry> = inner
            .history
            .iter()
            .rev()
            .filter(|entry| batch_id.is_none_or(|b| entry.batch_id == b))
            .filter(|entry| slug.is_none_or(|s| entry.slug == s))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn create_run(&self, run_type: &str, triggered_by: &str) -> Result<Uuid> {
        let mut inner = self.inner.lock().unwrap();
        let id = Uuid::new_v4();
        inner.runs.push(AuditRun {
            id,
            run_type: run_type.to_string(),
            status: RunStatus::Running.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            total_pages: None,
            processed_pages: None,
            fixed_pages: None,
            error_count: None,
            errors: None,
            summary: None,
            triggered_by: triggered_by.to_string(),
        });
        Ok(id)
    }

    async fn complete_run(&self, id: Uuid, completion: RunCompletion) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(run) = inner.runs.iter_mut().find(|run| run.id == id) {
            run.status = RunStatus::Completed.to_string();
            run.completed_at = Some(Utc::now());
            run.total_pages = Some(completion.total_pages);
            run.processed_pages = Some(completion.processed_pages);
            run.fixed_pages = Some(completion.fixed_pages);
            run.error_count = Some(completion.error_count);
            run.errors = Some(serde_json::json!(completion.errors));
            run.summary = Some(completion.summary);
        }
        Ok(())
    }

    async fn fail_run(&self, id: Uuid, error: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(run) = inner.runs.iter_mut().find(|run| run.id == id) {
            run.status = RunStatus::Failed.to_string();
            run.completed_at = Some(Utc::now());
            run.errors = Some(serde_json::json!([error]));
        }
        Ok(())
    }

    async fn recent_runs(&self, limit: i64) -> Result<Vec<AuditRun>> {
        let inner = self.inner.lock().unwrap();
        let mut runs: Vec<AuditRun> = inner.runs.iter().rev().cloned().collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(limit as usize);
        Ok(runs)
    }

    async fn raw_settings(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        Ok(self.inner.lock().unwrap().settings.clone())
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value, _actor: &str) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .settings
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn page_stats(&self) -> Result<PageStats> {
        let inner = self.inner.lock().unwrap();
        let total_pages = inner.pages.len() as i64;
        let duplicates = inner.pages.values().filter(|p| p.is_duplicate).count() as i64;
        let missing_meta = inner
            .pages
            .values()
            .filter(|p| p.meta_title.as_deref().unwrap_or("").is_empty())
            .count() as i64;
        Ok(PageStats {
            total_pages,
            duplicates,
            missing_meta,
        })
    }
}
