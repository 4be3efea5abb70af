use serde::{Deserialize, Serialize};

/// The page families the generator knows how to address.
/// Stored as snake_case text in the `page_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Static,
    State,
    City,
    Treatment,
    CityTreatment,
    Clinic,
    Dentist,
    Blog,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Static => "static",
            PageType::State => "state",
            PageType::City => "city",
            PageType::Treatment => "treatment",
            PageType::CityTreatment => "city_treatment",
            PageType::Clinic => "clinic",
            PageType::Dentist => "dentist",
            PageType::Blog => "blog",
        }
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PageType {
    type Err = crate::SeoBotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(PageType::Static),
            "state" => Ok(PageType::State),
            "city" => Ok(PageType::City),
            "treatment" => Ok(PageType::Treatment),
            "city_treatment" => Ok(PageType::CityTreatment),
            "clinic" => Ok(PageType::Clinic),
            "dentist" => Ok(PageType::Dentist),
            "blog" => Ok(PageType::Blog),
            other => Err(crate::SeoBotError::Validation(format!(
                "unknown page type: {other}"
            ))),
        }
    }
}

/// Lifecycle of an audit run. Created `Running`, finalized exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Tunable engine behavior, backed by the `seo_bot_settings` key-value table.
/// Components take this struct explicitly rather than reading settings ad hoc.
#[derive(Debug, Clone, PartialEq)]
pub struct BotSettings {
    /// Jaccard threshold for targeted near-duplicate queries.
    /// Key: `similarity_threshold` → `{"title": 0.85}`.
    pub title_similarity_threshold: f64,

    /// History recording is skipped entirely for runs larger than this,
    /// trading rollback coverage for bounded invocation time.
    /// Key: `history_skip_threshold`.
    pub history_skip_threshold: usize,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            title_similarity_threshold: 0.85,
            history_skip_threshold: 2000,
        }
    }
}

impl BotSettings {
    /// Build settings from the raw key-value rows, falling back to defaults
    /// for missing or malformed values.
    pub fn from_kv(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let defaults = Self::default();
        Self {
            title_similarity_threshold: map
                .get("similarity_threshold")
                .and_then(|v| v.get("title"))
                .and_then(|v| v.as_f64())
                .unwrap_or(defaults.title_similarity_threshold),
            history_skip_threshold: map
                .get("history_skip_threshold")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(defaults.history_skip_threshold),
        }
    }
}
