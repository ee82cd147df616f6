//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use axum::{http::StatusCode, response::IntoResponse, Json};
use driver_locator_common::error::{CommonError, LocatorError};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub LocatorError);

impl From<LocatorError> for AppError {
    fn from(err: LocatorError) -> Self {
        AppError(err)
    }
}

impl From<CommonError> for AppError {
    fn from(err: CommonError) -> Self {
        AppError(LocatorError::Common(err))
    }
}

impl AppError {
    /// HTTP status for the wrapped error.
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            LocatorError::Common(_) => StatusCode::BAD_REQUEST,
            LocatorError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Storage causes stay in the server log; clients get external_message().
        let payload = json!({
            "error": {
                "message": self.0.external_message(),
                "type": self.0.error_type(),
            }
        });

        (self.status_code(), Json(payload)).into_response()
    }
}
