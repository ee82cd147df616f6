use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use driver_locator::{api, AppState};
use driver_locator_common::config::{LocatorConfig, QueryErrorPolicy};
use serde_json::Value;
use tower::ServiceExt;

/// デフォルト設定のアプリケーション状態
#[allow(dead_code)]
pub fn test_state() -> AppState {
    AppState::new(LocatorConfig::default())
}

/// 検索エラーを伝播する設定のアプリケーション状態
#[allow(dead_code)]
pub fn propagating_state() -> AppState {
    AppState::new(LocatorConfig {
        on_query_error: QueryErrorPolicy::Propagate,
        ..LocatorConfig::default()
    })
}

/// テスト用のRouterを作成する（.oneshot()スタイルのテスト用）
#[allow(dead_code)]
pub fn create_test_router(state: AppState) -> Router {
    api::create_router(state)
}

/// JSONボディ付きPOSTを送信し、ステータスとJSONレスポンスを返す
#[allow(dead_code)]
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// GETを送信し、ステータスとJSONレスポンスを返す
#[allow(dead_code)]
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// 位置更新リクエストを送信する
#[allow(dead_code)]
pub async fn update_location(app: &Router, driver_id: &str, latitude: f64, longitude: f64) -> Value {
    let (status, body) = post_json(
        app,
        "/api/drivers/location",
        &serde_json::json!({
            "driver_id": driver_id,
            "location": { "latitude": latitude, "longitude": longitude },
            "status": "AVAILABLE"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    body
}

/// レスポンスに含まれるドライバーIDをソートして返す
#[allow(dead_code)]
pub fn driver_ids(body: &Value) -> Vec<String> {
    let mut ids: Vec<String> = body["drivers"]
        .as_array()
        .map(|drivers| {
            drivers
                .iter()
                .filter_map(|d| d["driver_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    ids.sort();
    ids
}
