use axum::{Router, routing::{get, post}};
use crate::{
    AppState,
    controllers::{instruments_controller, logs_controller, settings_controller},
};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/actions", get(instruments_controller::get_actions))
        .route("/api/add", post(instruments_controller::post_add))
        .route("/api/update", post(instruments_controller::post_update))
        .route("/api/delete", post(instruments_controller::post_delete))
        .route(
            "/api/settings",
            get(settings_controller::get_settings).post(settings_controller::post_settings),
        )
        .route("/api/logs", get(logs_controller::get_logs))
}
