//! ヘルスチェックAPIハンドラー

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::index::IndexStats;
use crate::AppState;

/// GET /api/health レスポンス
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "unavailable"
    pub status: &'static str,
    /// 追跡中のエージェント数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<usize>,
    /// インデックスのカウンタ
    pub stats: IndexStats,
}

/// GET /api/health - ヘルスチェック
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let stats = state.index.stats();
    match state.index.len().await {
        Ok(agents) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                agents: Some(agents),
                stats,
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                agents: None,
                stats,
            }),
        ),
    }
}
