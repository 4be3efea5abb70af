//! Store abstraction for the engine workflows.
//!
//! `SeoStore` is everything a workflow needs from persistence, behind one
//! trait so the whole engine runs against `testing::MemoryStore` in tests:
//! no network, no database, no Docker.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use seobot_store::{
    AuditRun, EntitySets, HistoryEntry, NewHistoryEntry, NewPage, PageStats, PageSummary, PgStore,
    RunCompletion,
};

#[async_trait]
pub trait SeoStore: Send + Sync {
    /// Load all active entities for enumeration.
    async fn load_entities(&self) -> Result<EntitySets>;

    /// Upsert one batch of generated pages, keyed on slug.
    async fn upsert_pages(&self, pages: &[NewPage]) -> Result<u64>;

    /// Scan every page's summary projection.
    async fn page_summaries(&self) -> Result<Vec<PageSummary>>;

    /// Summaries for a specific set of slugs.
    async fn pages_by_slugs(&self, slugs: &[String]) -> Result<Vec<PageSummary>>;

    /// Reset all duplicate flags (the "clear" half of clear-then-set).
    async fn clear_duplicate_flags(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Flag one batch of slugs as duplicates.
    async fn flag_duplicates(&self, slugs: &[String], now: DateTime<Utc>) -> Result<u64>;

    /// Write history values back onto a page (rollback apply).
    async fn restore_metadata(
        &self,
        slug: &str,
        meta_title: &str,
        meta_description: &str,
        h1: &str,
        metadata_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64>;

    /// Append one batch of history entries.
    async fn insert_history(&self, entries: &[NewHistoryEntry]) -> Result<u64>;

    /// History entries matching a batch and/or slug, newest first.
    async fn find_history(
        &self,
        batch_id: Option<&str>,
        slug: Option<&str>,
    ) -> Result<Vec<HistoryEntry>>;

    /// Open a run record in `running` state.
    async fn create_run(&self, run_type: &str, triggered_by: &str) -> Result<Uuid>;

    /// Finalize a run as completed.
    async fn complete_run(&self, id: Uuid, completion: RunCompletion) -> Result<()>;

    /// Finalize a run as failed.
    async fn fail_run(&self, id: Uuid, error: &str) -> Result<()>;

    /// The most recent runs, newest first.
    async fn recent_runs(&self, limit: i64) -> Result<Vec<AuditRun>>;

    /// Raw settings rows as a key → value map.
    async fn raw_settings(&self) -> Result<serde_json::Map<String, serde_json::Value>>;

    /// Upsert a single setting.
    async fn put_setting(&self, key: &str, value: serde_json::Value, actor: &str) -> Result<()>;

    /// Lightweight corpus counters.
    async fn page_stats(&self) -> Result<PageStats>;
}

#[async_trait]
impl SeoStore for PgStore {
    async fn load_entities(&self) -> Result<EntitySets> {
        Ok(PgStore::load_entities(self).await)
    }

    async fn upsert_pages(&self, pages: &[NewPage]) -> Result<u64> {
        Ok(PgStore::upsert_pages(self, pages).await?)
    }

    async fn page_summaries(&self) -> Result<Vec<PageSummary>> {
        Ok(PgStore::page_summaries(self).await)
    }

    async fn pages_by_slugs(&self, slugs: &[String]) -> Result<Vec<PageSummary>> {
        Ok(PgStore::pages_by_slugs(self, slugs).await?)
    }

    async fn clear_duplicate_flags(&self, now: DateTime<Utc>) -> Result<u64> {
        Ok(PgStore::clear_duplicate_flags(self, now).await?)
    }

    async fn flag_duplicates(&self, slugs: &[String], now: DateTime<Utc>) -> Result<u64> {
        Ok(PgStore::flag_duplicates(self, slugs, now).await?)
    }

    async fn restore_metadata(
        &self,
        slug: &str,
        meta_title: &str,
        meta_description: &str,
        h1: &str,
        metadata_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        Ok(
            PgStore::restore_metadata(self, slug, meta_title, meta_description, h1, metadata_hash, now)
                .await?,
        )
    }

    async fn insert_history(&self, entries: &[NewHistoryEntry]) -> Result<u64> {
        Ok(PgStore::insert_history(self, entries).await?)
    }

    async fn find_history(
        &self,
        batch_id: Option<&str>,
        slug: Option<&str>,
    ) -> Result<Vec<HistoryEntry>> {
        Ok(PgStore::find_history(self, batch_id, slug).await?)
    }

    async fn create_run(&self, run_type: &str, triggered_by: &str) -> Result<Uuid> {
        Ok(PgStore::create_run(self, run_type, triggered_by).await?)
    }

    async fn complete_run(&self, id: Uuid, completion: RunCompletion) -> Result<()> {
        Ok(PgStore::complete_run(self, id, completion).await?)
    }

    async fn fail_run(&self, id: Uuid, error: &str) -> Result<()> {
        Ok(PgStore::fail_run(self, id, error).await?)
    }

    async fn recent_runs(&self, limit: i64) -> Result<Vec<AuditRun>> {
        Ok(PgStore::recent_runs(self, limit).await?)
    }

    async fn raw_settings(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        Ok(PgStore::raw_settings(self).await?)
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value, actor: &str) -> Result<()> {
        Ok(PgStore::put_setting(self, key, value, actor).await?)
    }

    async fn page_stats(&self) -> Result<PageStats> {
        Ok(PgStore::page_stats(self).await?)
    }
}
