//! Postgres persistence for the SEO metadata engine.
//!
//! One `PgStore` over a connection pool; entity loaders, page upserts,
//! metadata history, audit runs and the settings table all live here.
//! Reads that feed corpus-wide passes are windowed (`WINDOW` rows at a
//! time) so no single-request row cap can silently truncate them.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod entities;
pub mod error;
pub mod history;
pub mod pages;
pub mod runs;
pub mod settings;

pub use entities::{BlogPost, City, Clinic, Dentist, EntitySets, State, Treatment};
pub use error::{Result, StoreError};
pub use history::{HistoryEntry, NewHistoryEntry};
pub use pages::{NewPage, PageStats, PageSummary};
pub use runs::{AuditRun, RunCompletion};

/// Rows fetched per window when scanning a whole table.
pub(crate) const WINDOW: i64 = 1000;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to Postgres and build a store.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
