use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use snafu::Snafu;

use super::StorageError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("Failed to read data"))]
    ReadData { source: StorageError },

    #[snafu(display("Failed to save data"))]
    SaveData { source: StorageError },
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::ReadData { source } => tracing::error!(error = %source, "error reading data file"),
            ApiError::SaveData { source } => tracing::error!(error = %source, "error saving data"),
        }

        let content = ErrorResponse {
            error: self.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(content)).into_response()
    }
}
