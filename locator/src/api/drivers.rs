//! ドライバー位置更新APIハンドラー

use axum::{extract::State, http::StatusCode, Json};
use driver_locator_common::protocol::{LocationAck, UpdateLocationRequest};
use tracing::warn;

use super::error::AppError;
use crate::AppState;

/// POST /api/drivers/location - 位置更新
///
/// Always answers with a `LocationAck`; failures carry `success: false`.
pub async fn update_location(
    State(state): State<AppState>,
    Json(req): Json<UpdateLocationRequest>,
) -> (StatusCode, Json<LocationAck>) {
    match state.index.upsert(&req.driver_id, req.location).await {
        Ok(_) => (StatusCode::OK, Json(LocationAck::stored())),
        Err(err) => {
            if err.is_validation() {
                warn!(driver_id = %req.driver_id, error = %err, "Rejected location update");
            }
            let message = err.external_message();
            let status = AppError(err).status_code();
            (status, Json(LocationAck::failed(message)))
        }
    }
}
