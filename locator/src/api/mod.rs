//! REST APIハンドラー
//!
//! 位置更新、近隣検索、ヘルスチェック

pub mod drivers;
pub mod error;
pub mod health;
pub mod riders;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/drivers/location", post(drivers::update_location))
        .route("/api/riders/nearby", post(riders::nearest_drivers))
        .route("/api/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
