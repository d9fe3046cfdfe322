use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    controllers::json_body,
    error::AppError,
    models::InstrumentView,
    services::{
        instruments_service::{self, InstrumentConfig, InstrumentPatch},
        logs_service,
    },
    AppState,
};

/// Body shared by add and update; which fields are required depends on the call.
#[derive(Debug, Default, Deserialize)]
pub struct InstrumentRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub base_price: Option<Value>,
    #[serde(default)]
    pub upper_threshold: Option<Value>,
    #[serde(default)]
    pub lower_threshold: Option<Value>,
    #[serde(default)]
    pub upper_note: Option<String>,
    #[serde(default)]
    pub lower_note: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

fn fmt_opt(x: Option<f64>) -> String {
    x.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

// GET /api/actions
pub async fn get_actions(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, InstrumentView>>, AppError> {
    Ok(Json(instruments_service::list_views(&state.db).await?))
}

// POST /api/add
pub async fn post_add(
    State(state): State<AppState>,
    payload: Result<Json<InstrumentRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let req = json_body(payload)?;

    let cfg = InstrumentConfig::parse(
        req.symbol.as_deref(),
        req.base_price.as_ref(),
        req.upper_threshold.as_ref(),
        req.lower_threshold.as_ref(),
        req.upper_note.as_deref(),
        req.lower_note.as_deref(),
        req.active,
    )?;

    instruments_service::upsert_instrument(&state.db, &cfg).await?;

    tracing::info!("instrument {} configured", cfg.symbol);
    logs_service::record(
        &state.db,
        &format!(
            "Added/updated {} (base={}, upper={}, lower={})",
            cfg.symbol,
            fmt_opt(cfg.base_price),
            cfg.upper_threshold,
            cfg.lower_threshold
        ),
    )
    .await;

    Ok(Json(json!({ "ok": true })))
}

// POST /api/update
pub async fn post_update(
    State(state): State<AppState>,
    payload: Result<Json<InstrumentRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let req = json_body(payload)?;

    let patch = InstrumentPatch::parse(
        req.symbol.as_deref(),
        req.base_price.as_ref(),
        req.upper_threshold.as_ref(),
        req.lower_threshold.as_ref(),
        req.upper_note.as_deref(),
        req.lower_note.as_deref(),
        req.active,
    )?;

    instruments_service::update_instrument(&state.db, &patch).await?;

    tracing::info!("instrument {} updated ({} fields)", patch.symbol, patch.updates.len());
    logs_service::record(&state.db, &format!("Updated {}", patch.symbol)).await;

    Ok(Json(json!({ "ok": true })))
}

// POST /api/delete
pub async fn post_delete(
    State(state): State<AppState>,
    payload: Result<Json<SymbolRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let req = json_body(payload)?;
    let symbol = instruments_service::normalize_symbol(req.symbol.as_deref())?;

    instruments_service::delete_instrument(&state.db, &symbol).await?;

    tracing::info!("instrument {} removed", symbol);
    logs_service::record(&state.db, &format!("Removed {symbol}")).await;

    Ok(Json(json!({ "ok": true })))
}
