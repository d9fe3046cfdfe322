use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse},
    Json,
};
use mongodb::bson::doc;
use serde_json::json;

use crate::{error::AppError, AppState};

// GET /
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let check_times: Vec<String> = state
        .settings
        .check_times
        .iter()
        .map(|t| t.to_string())
        .collect();

    let ctx = json!({
        "title": "Price Watch",
        "timezone": state.settings.timezone.name(),
        "check_times": check_times,
        "wake_interval_secs": state.settings.wake_interval.as_secs(),
    });

    Ok(Html(state.hbs.render("pages/dashboard", &ctx)?))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no route for {}", uri.path()) })),
    )
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.run_command(doc! { "ping": 1 }, None).await {
        Ok(_) => (StatusCode::OK, Html("mongo: ok".to_string())).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("mongo error: {}", e)),
        )
            .into_response(),
    }
}
