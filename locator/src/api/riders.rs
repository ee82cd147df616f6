//! 近隣ドライバー検索APIハンドラー

use axum::{extract::State, Json};
use driver_locator_common::protocol::{Driver, NearbyDriversRequest, NearbyDriversResponse};
use tracing::info;

use super::error::AppError;
use crate::AppState;

/// POST /api/riders/nearby - 近隣ドライバー検索
///
/// Store failures come back as an empty list unless the index was configured
/// with the `propagate` query error policy.
pub async fn nearest_drivers(
    State(state): State<AppState>,
    Json(req): Json<NearbyDriversRequest>,
) -> Result<Json<NearbyDriversResponse>, AppError> {
    let (radius, unit) = req.resolve_radius()?;

    info!(
        center = %req.location,
        radius,
        %unit,
        "Searching for nearby drivers"
    );

    let agents = state.index.radius_search(req.location, radius, unit).await?;
    let drivers: Vec<Driver> = agents.into_iter().map(Driver::from).collect();

    info!(found = drivers.len(), "Nearby driver search finished");
    Ok(Json(NearbyDriversResponse { drivers }))
}
