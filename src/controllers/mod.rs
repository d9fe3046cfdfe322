use axum::{extract::rejection::JsonRejection, Json};

use crate::error::AppError;

pub mod home_controller;
pub mod instruments_controller;
pub mod logs_controller;
pub mod settings_controller;

/// Unwraps a JSON body, turning malformed input into a 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::Validation(e.body_text()))
}
