//! seo_pages persistence: batched idempotent upserts keyed on slug,
//! corpus scans for the duplicate/audit passes, and the duplicate-flag
//! clear-then-set updates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::QueryBuilder;

use crate::entities::fetch_paged;
use crate::error::Result;
use crate::PgStore;

/// Full generated metadata for one page, as written by a generation run.
/// The duplicate flag is deliberately absent: it is owned by the duplicate
/// pass and must survive regeneration upserts untouched.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub slug: String,
    pub page_type: String,
    pub title: String,
    pub meta_title: String,
    pub meta_description: String,
    pub h1: String,
    pub og_title: String,
    pub og_description: String,
    pub canonical_url: String,
    pub metadata_hash: String,
    pub is_indexed: bool,
    pub last_generated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The projection the duplicate and audit passes work from.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PageSummary {
    pub slug: String,
    pub page_type: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_indexed: bool,
    pub is_duplicate: bool,
    pub last_generated_at: Option<DateTime<Utc>>,
}

/// Lightweight corpus counters for the default stats action.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PageStats {
    pub total_pages: i64,
    pub duplicates: i64,
    pub missing_meta: i64,
}

const SUMMARY_SELECT: &str = "SELECT slug, page_type, meta_title, meta_description, \
     is_indexed, is_duplicate, last_generated_at FROM seo_pages ORDER BY slug";

impl PgStore {
    /// Upsert one batch of generated pages. Callers chunk the corpus; one
    /// failed batch must not abort the run, so errors propagate per batch.
    pub async fn upsert_pages(&self, pages: &[NewPage]) -> Result<u64> {
        if pages.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::new(
            "INSERT INTO seo_pages (slug, page_type, title, meta_title, meta_description, \
             h1, og_title, og_description, canonical_url, metadata_hash, is_indexed, \
             last_generated_at, updated_at) ",
        );
        qb.push_values(pages, |mut row, page| {
            row.push_bind(&page.slug)
                .push_bind(&page.page_type)
                .push_bind(&page.title)
                .push_bind(&page.meta_title)
                .push_bind(&page.meta_description)
                .push_bind(&page.h1)
                .push_bind(&page.og_title)
                .push_bind(&page.og_description)
                .push_bind(&page.canonical_url)
                .push_bind(&page.metadata_hash)
                .push_bind(page.is_indexed)
                .push_bind(page.last_generated_at)
                .push_bind(page.updated_at);
        });
        qb.push(
            " ON CONFLICT (slug) DO UPDATE SET \
             page_type = EXCLUDED.page_type, \
             title = EXCLUDED.title, \
             meta_title = EXCLUDED.meta_title, \
             meta_description = EXCLUDED.meta_description, \
             h1 = EXCLUDED.h1, \
             og_title = EXCLUDED.og_title, \
             og_description = EXCLUDED.og_description, \
             canonical_url = EXCLUDED.canonical_url, \
             metadata_hash = EXCLUDED.metadata_hash, \
             is_indexed = EXCLUDED.is_indexed, \
             last_generated_at = EXCLUDED.last_generated_at, \
             updated_at = EXCLUDED.updated_at",
        );

        let result = qb.build().execute(self.pool()).await?;
        Ok(result.rows_affected())
    }

    /// Every page's summary projection, scanned in windows.
    pub async fn page_summaries(&self) -> Vec<PageSummary> {
        fetch_paged(self.pool(), SUMMARY_SELECT).await
    }

    /// Summaries for a specific set of slugs.
    pub async fn pages_by_slugs(&self, slugs: &[String]) -> Result<Vec<PageSummary>> {
        let rows = sqlx::query_as::<_, PageSummary>(
            "SELECT slug, page_type, meta_title, meta_description, is_indexed, \
             is_duplicate, last_generated_at FROM seo_pages WHERE slug = ANY($1)",
        )
        .bind(slugs)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Reset every duplicate flag. Returns the number of rows cleared.
    pub async fn clear_duplicate_flags(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE seo_pages SET is_duplicate = FALSE, updated_at = $1 WHERE is_duplicate = TRUE",
        )
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Flag one batch of slugs as duplicates.
    pub async fn flag_duplicates(&self, slugs: &[String], now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE seo_pages SET is_duplicate = TRUE, updated_at = $2 WHERE slug = ANY($1)",
        )
        .bind(slugs)
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Write history values back onto a page (rollback apply).
    pub async fn restore_metadata(
        &self,
        slug: &str,
        meta_title: &str,
        meta_description: &str,
        h1: &str,
        metadata_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE seo_pages SET meta_title = $2, meta_description = $3, h1 = $4, \
             og_title = $2, og_description = $3, metadata_hash = $5, updated_at = $6 \
             WHERE slug = $1",
        )
        .bind(slug)
        .bind(meta_title)
        .bind(meta_description)
        .bind(h1)
        .bind(metadata_hash)
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Corpus counters for the default stats response.
    pub async fn page_stats(&self) -> Result<PageStats> {
        let stats = sqlx::query_as::<_, PageStats>(
            "SELECT COUNT(*) AS total_pages, \
             COUNT(*) FILTER (WHERE is_duplicate) AS duplicates, \
             COUNT(*) FILTER (WHERE meta_title IS NULL OR meta_title = '') AS missing_meta \
             FROM seo_pages",
        )
        .fetch_one(self.pool())
        .await?;
        Ok(stats)
    }
}
