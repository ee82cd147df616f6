//! Contract Test: POST /api/drivers/location
//!
//! 位置更新APIの契約テスト

use axum::http::StatusCode;
use serde_json::json;

use crate::support::locator::{create_test_router, post_json, test_state};

/// 正常系: 新規ドライバーの位置が保存される
#[tokio::test]
async fn update_location_stores_new_driver() {
    let state = test_state();
    let app = create_test_router(state.clone());

    let (status, body) = post_json(
        &app,
        "/api/drivers/location",
        &json!({
            "driver_id": "driver_tommy_trojan",
            "location": { "latitude": 34.0256, "longitude": -118.2851 },
            "status": "AVAILABLE"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Location stored");

    let record = state
        .index
        .get("driver_tommy_trojan")
        .await
        .unwrap()
        .expect("driver should be stored");
    assert_eq!(record.coordinate.latitude, 34.0256);
    assert_eq!(record.coordinate.longitude, -118.2851);
}

/// 正常系: statusは省略可能
#[tokio::test]
async fn update_location_accepts_missing_status() {
    let app = create_test_router(test_state());

    let (status, body) = post_json(
        &app,
        "/api/drivers/location",
        &json!({
            "driver_id": "driver-1",
            "location": { "latitude": 0.0, "longitude": 0.0 }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

/// 正常系: 同じドライバーの再送信は上書きされ、件数は増えない
#[tokio::test]
async fn update_location_overwrites_previous_position() {
    let state = test_state();
    let app = create_test_router(state.clone());

    for (lat, lon) in [(34.0, -118.0), (40.7128, -74.0060)] {
        let (status, _) = post_json(
            &app,
            "/api/drivers/location",
            &json!({
                "driver_id": "driver-1",
                "location": { "latitude": lat, "longitude": lon }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(state.index.len().await.unwrap(), 1);
    let record = state.index.get("driver-1").await.unwrap().unwrap();
    assert_eq!(record.coordinate.latitude, 40.7128);
    assert_eq!(record.coordinate.longitude, -74.0060);
}

/// 異常系: 空のdriver_idは400
#[tokio::test]
async fn update_location_rejects_empty_driver_id() {
    let state = test_state();
    let app = create_test_router(state.clone());

    let (status, body) = post_json(
        &app,
        "/api/drivers/location",
        &json!({
            "driver_id": "",
            "location": { "latitude": 34.0, "longitude": -118.0 }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("agent_id"));
    assert!(state.index.is_empty().await.unwrap());
}

/// 異常系: 範囲外の緯度・経度は400で、インデックスは変化しない
#[tokio::test]
async fn update_location_rejects_out_of_range_coordinates() {
    let state = test_state();
    let app = create_test_router(state.clone());

    for (lat, lon) in [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.1), (0.0, -200.0)] {
        let (status, body) = post_json(
            &app,
            "/api/drivers/location",
            &json!({
                "driver_id": "driver-1",
                "location": { "latitude": lat, "longitude": lon }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "({lat}, {lon})");
        assert_eq!(body["success"], false);
    }

    assert!(state.index.get("driver-1").await.unwrap().is_none());
}

/// 異常系: 不正なJSONは拒否される
#[tokio::test]
async fn update_location_rejects_malformed_body() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = create_test_router(test_state());
    let request = Request::builder()
        .method("POST")
        .uri("/api/drivers/location")
        .header("content-type", "application/json")
        .body(Body::from("{\"driver_id\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

/// 異常系: インデックス停止後の更新は503
#[tokio::test]
async fn update_location_reports_unavailable_store() {
    let state = test_state();
    let app = create_test_router(state.clone());
    state.index.close().await;

    let (status, body) = post_json(
        &app,
        "/api/drivers/location",
        &json!({
            "driver_id": "driver-1",
            "location": { "latitude": 34.0, "longitude": -118.0 }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Location store unavailable");
}
