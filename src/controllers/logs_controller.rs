use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{config::MAX_LOG_LIMIT, error::AppError, services::logs_service, AppState};

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

// GET /api/logs?limit=N
pub async fn get_logs(
    State(state): State<AppState>,
    Query(q): Query<LogsQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let limit = q
        .limit
        .unwrap_or(state.settings.log_limit)
        .clamp(1, MAX_LOG_LIMIT);

    let entries = logs_service::recent(&state.db, limit).await?;
    let tz = state.settings.timezone;

    Ok(Json(entries.iter().map(|e| e.render(&tz)).collect()))
}
