use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use analytics::AnalyticsError;
use core_types::CoreError;
use datastore::DataError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("Invalid request: {0}")]
    Input(#[from] CoreError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Data(DataError::Empty(file)) => (
                StatusCode::NOT_FOUND,
                format!("No rows found in {}", file),
            ),
            AppError::Data(data_err) => {
                tracing::error!(error = %data_err, "Data error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while reading the data files".to_string(),
                )
            }
            AppError::Analytics(analytics_err) => {
                tracing::warn!(error = %analytics_err, "Simulation rejected.");
                (StatusCode::UNPROCESSABLE_ENTITY, analytics_err.to_string())
            }
            AppError::Input(input_err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, input_err.to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
