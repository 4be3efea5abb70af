//! The single bot dispatch route: authenticate, authorize, then fan out on
//! the `action` field. Every response is JSON with a `success` flag.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::Json,
};
use serde::Deserialize;
use tracing::info;

use seobot_common::BotSettings;
use seobot_engine::{workflows, SeoStore};

use crate::error::ApiError;
use crate::jwt::ROLE_SUPER_ADMIN;
use crate::AppState;

const AVAILABLE_ACTIONS: [&str; 9] = [
    "generate_metadata",
    "check_duplicates",
    "audit",
    "rollback",
    "rollback_apply",
    "similar_pages",
    "get_settings",
    "update_settings",
    "get_runs",
];

const DEFAULT_SIMILAR_LIMIT: usize = 10;

/// Authenticated caller holding the elevated role. Extraction rejects the
/// request before any data access: missing/invalid token → 401, valid token
/// without the role → 403.
pub struct AdminUser {
    pub user_id: String,
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthenticated("Authentication required".into()))?;

        let claims = state
            .jwt
            .verify_token(token)
            .map_err(|_| ApiError::Unauthenticated("Invalid authentication".into()))?;

        if claims.role != ROLE_SUPER_ADMIN {
            return Err(ApiError::Forbidden("Forbidden".into()));
        }

        Ok(AdminUser {
            user_id: claims.sub,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BotRequest {
    pub action: Option<String>,
    pub batch_id: Option<String>,
    pub slug: Option<String>,
    pub key: Option<String>,
    pub value: Option<serde_json::Value>,
    pub limit: Option<usize>,
}

pub async fn handle(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(request): Json<BotRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store: &dyn SeoStore = &state.store;
    let action = request.action.as_deref().unwrap_or("");
    info!(action, user = admin.user_id.as_str(), "Bot action requested");

    match action {
        "generate_metadata" => {
            let settings = load_settings(store).await;
            let outcome = workflows::generate::generate_metadata(
                store,
                &settings,
                &state.base_url,
                &admin.user_id,
            )
            .await?;
            respond(action, serde_json::to_value(&outcome)?)
        }
        "check_duplicates" => {
            let outcome = workflows::duplicates::check_duplicates(store).await?;
            respond(action, serde_json::to_value(&outcome)?)
        }
        "audit" => {
            let report = workflows::audit::audit(store).await?;
            respond(action, serde_json::to_value(&report)?)
        }
        "rollback" => {
            let preview = workflows::rollback::preview(
                store,
                request.batch_id.as_deref(),
                request.slug.as_deref(),
            )
            .await?;
            respond(action, serde_json::to_value(&preview)?)
        }
        "rollback_apply" => {
            let outcome = workflows::rollback::apply(
                store,
                request.batch_id.as_deref(),
                request.slug.as_deref(),
                &admin.user_id,
            )
            .await?;
            respond(action, serde_json::to_value(&outcome)?)
        }
        "similar_pages" => {
            let slug = request
                .slug
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("slug required".into()))?;
            let settings = load_settings(store).await;
            let limit = request.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
            let outcome = workflows::similar::similar_pages(store, slug, limit, &settings).await?;
            respond(action, serde_json::to_value(&outcome)?)
        }
        "get_settings" => {
            let settings = store.raw_settings().await?;
            Ok(Json(serde_json::json!({
                "success": true,
                "settings": settings,
            })))
        }
        "update_settings" => {
            let key = request
                .key
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("key required".into()))?;
            let value = request.value.unwrap_or(serde_json::Value::Null);
            store.put_setting(key, value, &admin.user_id).await?;
            Ok(Json(serde_json::json!({
                "success": true,
                "action": action,
                "key": key,
            })))
        }
        "get_runs" => {
            let runs = workflows::recent_runs(store).await?;
            Ok(Json(serde_json::json!({
                "success": true,
                "runs": runs,
            })))
        }
        // No or unknown action: current corpus stats plus the action list.
        _ => {
            let stats = workflows::corpus_stats(store).await?;
            Ok(Json(serde_json::json!({
                "success": true,
                "stats": stats,
                "available_actions": AVAILABLE_ACTIONS,
            })))
        }
    }
}

/// Merge an outcome's fields into the standard response envelope.
fn respond(action: &str, outcome: serde_json::Value) -> Result<Json<serde_json::Value>, ApiError> {
    let mut body = match outcome {
        serde_json::Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("result".into(), other);
            map
        }
    };
    body.insert("success".into(), serde_json::Value::Bool(true));
    body.insert("action".into(), serde_json::Value::String(action.to_string()));
    Ok(Json(serde_json::Value::Object(body)))
}

async fn load_settings(store: &dyn SeoStore) -> BotSettings {
    BotSettings::from_kv(&store.raw_settings().await.unwrap_or_default())
}
