//! Audit-run tracking: one row per bulk invocation, created `running`,
//! finalized exactly once as `completed` or `failed`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use seobot_common::RunStatus;

use crate::error::Result;
use crate::PgStore;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditRun {
    pub id: Uuid,
    pub run_type: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_pages: Option<i32>,
    pub processed_pages: Option<i32>,
    pub fixed_pages: Option<i32>,
    pub error_count: Option<i32>,
    pub errors: Option<serde_json::Value>,
    pub summary: Option<serde_json::Value>,
    pub triggered_by: String,
}

/// Final counters written when a run completes.
#[derive(Debug, Clone)]
pub struct RunCompletion {
    pub total_pages: i32,
    pub processed_pages: i32,
    pub fixed_pages: i32,
    pub error_count: i32,
    pub errors: Vec<String>,
    pub summary: serde_json::Value,
}

impl PgStore {
    /// Open a new run in `running` state, returning its id.
    pub async fn create_run(&self, run_type: &str, triggered_by: &str) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO seo_audit_runs (run_type, status, started_at, triggered_by) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(run_type)
        .bind(RunStatus::Running.to_string())
        .bind(Utc::now())
        .bind(triggered_by)
        .fetch_one(self.pool())
        .await?;
        Ok(id)
    }

    /// Finalize a run as completed with its counters and summary.
    pub async fn complete_run(&self, id: Uuid, completion: RunCompletion) -> Result<()> {
        sqlx::query(
            "UPDATE seo_audit_runs SET status = $2, completed_at = $3, \
             total_pages = $4, processed_pages = $5, fixed_pages = $6, error_count = $7, \
             errors = $8, summary = $9 WHERE id = $1",
        )
        .bind(id)
        .bind(RunStatus::Completed.to_string())
        .bind(Utc::now())
        .bind(completion.total_pages)
        .bind(completion.processed_pages)
        .bind(completion.fixed_pages)
        .bind(completion.error_count)
        .bind(serde_json::json!(completion.errors))
        .bind(completion.summary)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Finalize a run as failed with the escaping error message.
    pub async fn fail_run(&self, id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            "UPDATE seo_audit_runs SET status = $2, completed_at = $3, errors = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(RunStatus::Failed.to_string())
        .bind(Utc::now())
        .bind(serde_json::json!([error]))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// The most recent runs, newest first.
    pub async fn recent_runs(&self, limit: i64) -> Result<Vec<AuditRun>> {
        let rows = sqlx::query_as::<_, AuditRun>(
            "SELECT id, run_type, status, started_at, completed_at, total_pages, \
             processed_pages, fixed_pages, error_count, errors, summary, triggered_by \
             FROM seo_audit_runs ORDER BY started_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
