//! Key-value bot settings. Raw rows are exposed as a JSON map; typed
//! access goes through `seobot_common::BotSettings::from_kv`.

use chrono::Utc;

use crate::error::Result;
use crate::PgStore;

impl PgStore {
    /// All settings rows as a key → value map.
    pub async fn raw_settings(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let rows = sqlx::query_as::<_, (String, serde_json::Value)>(
            "SELECT setting_key, setting_value FROM seo_bot_settings",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Upsert a single setting.
    pub async fn put_setting(
        &self,
        key: &str,
        value: serde_json::Value,
        actor: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO seo_bot_settings (setting_key, setting_value, updated_at, updated_by) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (setting_key) DO UPDATE SET setting_value = EXCLUDED.setting_value, \
             updated_at = EXCLUDED.updated_at, updated_by = EXCLUDED.updated_by",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .bind(actor)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
