//! Append-only metadata changelog. Entries are written once per page per
//! generation batch and never mutated; rollback works by reading them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::error::Result;
use crate::PgStore;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub slug: String,
    pub new_title: String,
    pub new_meta_description: String,
    pub new_h1: String,
    pub change_reason: String,
    pub changed_by: String,
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub slug: String,
    pub new_title: String,
    pub new_meta_description: String,
    pub new_h1: String,
    pub change_reason: String,
    pub changed_by: String,
    pub batch_id: String,
}

impl PgStore {
    /// Insert one batch of history entries.
    pub async fn insert_history(&self, entries: &[NewHistoryEntry]) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::new(
            "INSERT INTO seo_metadata_history (slug, new_title, new_meta_description, \
             new_h1, change_reason, changed_by, batch_id) ",
        );
        qb.push_values(entries, |mut row, entry| {
            row.push_bind(&entry.slug)
                .push_bind(&entry.new_title)
                .push_bind(&entry.new_meta_description)
                .push_bind(&entry.new_h1)
                .push_bind(&entry.change_reason)
                .push_bind(&entry.changed_by)
                .push_bind(&entry.batch_id);
        });

        let result = qb.build().execute(self.pool()).await?;
        Ok(result.rows_affected())
    }

    /// History entries matching a batch and/or slug, newest first.
    /// Callers validate that at least one filter is present.
    pub async fn find_history(
        &self,
        batch_id: Option<&str>,
        slug: Option<&str>,
    ) -> Result<Vec<HistoryEntry>> {
        let mut qb = QueryBuilder::new(
            "SELECT id, slug, new_title, new_meta_description, new_h1, change_reason, \
             changed_by, batch_id, created_at FROM seo_metadata_history WHERE TRUE",
        );
        if let Some(batch_id) = batch_id {
            qb.push(" AND batch_id = ").push_bind(batch_id);
        }
        if let Some(slug) = slug {
            qb.push(" AND slug = ").push_bind(slug);
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb
            .build_query_as::<HistoryEntry>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }
}
