use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    controllers::json_body,
    error::AppError,
    models::NotifierSettings,
    services::{logs_service, settings_service},
    AppState,
};

// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<NotifierSettings>, AppError> {
    Ok(Json(settings_service::get_settings(&state.db).await?))
}

// POST /api/settings
pub async fn post_settings(
    State(state): State<AppState>,
    payload: Result<Json<NotifierSettings>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let settings = json_body(payload)?;

    settings_service::save_settings(&state.db, &settings).await?;

    tracing::info!("notifier settings updated (configured={})", settings.is_configured());
    logs_service::record(&state.db, "Updated notification token/chat id").await;

    Ok(Json(json!({ "ok": true })))
}
