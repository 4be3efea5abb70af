//! Bulk entity loaders feeding the page-space enumerator.
//!
//! Every loader scans its whole table in fixed windows so results are never
//! capped by a single-request row limit. A read error mid-scan logs and
//! returns whatever was accumulated; callers treat odd counts as a
//! possible partial fetch, not a hard failure.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{PgStore, WINDOW};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct State {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct City {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub state_id: Uuid,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Treatment {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Clinic {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub city_id: Option<Uuid>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Dentist {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub title: Option<String>,
    pub specializations: Vec<String>,
    pub clinic_id: Option<Uuid>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlogPost {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
}

/// The six entity sets a generation run works from, loaded concurrently.
#[derive(Debug, Clone, Default)]
pub struct EntitySets {
    pub states: Vec<State>,
    pub cities: Vec<City>,
    pub treatments: Vec<Treatment>,
    pub clinics: Vec<Clinic>,
    pub dentists: Vec<Dentist>,
    pub posts: Vec<BlogPost>,
}

/// Scan a whole table in `WINDOW`-sized pages. `base` must be a complete
/// SELECT with a deterministic ORDER BY; LIMIT/OFFSET are appended here.
pub(crate) async fn fetch_paged<T>(pool: &PgPool, base: &str) -> Vec<T>
where
    T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let mut rows: Vec<T> = Vec::new();
    let mut offset: i64 = 0;
    loop {
        let query = format!("{base} LIMIT {WINDOW} OFFSET {offset}");
        match sqlx::query_as::<_, T>(&query).fetch_all(pool).await {
            Ok(window) => {
                let short = (window.len() as i64) < WINDOW;
                rows.extend(window);
                if short {
                    break;
                }
                offset += WINDOW;
            }
            Err(e) => {
                warn!(query = base, error = %e, "Windowed scan failed, returning partial result");
                break;
            }
        }
    }
    rows
}

impl PgStore {
    /// Load all active entities, the six tables in parallel.
    pub async fn load_entities(&self) -> EntitySets {
        let started = Utc::now();
        let (states, cities, treatments, clinics, dentists, posts) = tokio::join!(
            fetch_paged::<State>(
                self.pool(),
                "SELECT id, slug, name, abbreviation FROM states WHERE is_active = TRUE ORDER BY slug",
            ),
            fetch_paged::<City>(
                self.pool(),
                "SELECT id, slug, name, state_id FROM cities WHERE is_active = TRUE ORDER BY slug, id",
            ),
            fetch_paged::<Treatment>(
                self.pool(),
                "SELECT id, slug, name FROM treatments WHERE is_active = TRUE ORDER BY slug",
            ),
            fetch_paged::<Clinic>(
                self.pool(),
                "SELECT id, slug, name, city_id FROM clinics WHERE is_active = TRUE ORDER BY slug",
            ),
            fetch_paged::<Dentist>(
                self.pool(),
                "SELECT id, slug, name, title, specializations, clinic_id FROM dentists WHERE is_active = TRUE ORDER BY slug",
            ),
            fetch_paged::<BlogPost>(
                self.pool(),
                "SELECT id, slug, title, excerpt FROM blog_posts WHERE status = 'published' ORDER BY slug",
            ),
        );

        info!(
            states = states.len(),
            cities = cities.len(),
            treatments = treatments.len(),
            clinics = clinics.len(),
            dentists = dentists.len(),
            posts = posts.len(),
            elapsed_ms = (Utc::now() - started).num_milliseconds(),
            "Entities loaded"
        );

        EntitySets {
            states,
            cities,
            treatments,
            clinics,
            dentists,
            posts,
        }
    }
}
