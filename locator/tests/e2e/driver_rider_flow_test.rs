//! E2E: ドライバー位置更新 → 乗客の近隣検索 → シャットダウン

use std::time::Duration;

use driver_locator::AppState;
use driver_locator_common::{
    config::LocatorConfig,
    protocol::{LocationAck, NearbyDriversResponse},
};
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::support::http::spawn_locator;

#[tokio::test]
async fn driver_updates_are_visible_to_riders_over_http() {
    let server = spawn_locator(AppState::new(LocatorConfig::default())).await;
    let client = Client::new();

    let ack: LocationAck = client
        .post(server.url("/api/drivers/location"))
        .json(&json!({
            "driver_id": "driver_tommy_trojan",
            "location": { "latitude": 34.0256, "longitude": -118.2851 },
            "status": "AVAILABLE"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(ack.success);

    let response = client
        .post(server.url("/api/riders/nearby"))
        .json(&json!({
            "location": { "latitude": 34.0224, "longitude": -118.2851 },
            "radius_miles": 5.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let nearby: NearbyDriversResponse = response.json().await.unwrap();
    assert_eq!(nearby.drivers.len(), 1);
    assert_eq!(nearby.drivers[0].driver_id, "driver_tommy_trojan");
    assert_eq!(nearby.drivers[0].status, "AVAILABLE");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn shutdown_closes_the_index() {
    let server = spawn_locator(AppState::new(LocatorConfig::default())).await;
    let index = server.state().index.clone();
    index
        .upsert(
            "driver-1",
            driver_locator_common::types::Coordinate {
                latitude: 1.0,
                longitude: 1.0,
            },
        )
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), server.stop())
        .await
        .expect("server did not shut down")
        .unwrap();

    assert!(index.len().await.is_err());
}

#[tokio::test]
async fn server_runs_stale_sweeper_when_enabled() {
    let config = LocatorConfig {
        stale_after_secs: 1,
        sweep_interval_secs: 1,
        ..LocatorConfig::default()
    };
    let server = spawn_locator(AppState::new(config)).await;
    let client = Client::new();

    let response = client
        .post(server.url("/api/drivers/location"))
        .json(&json!({
            "driver_id": "driver-gone",
            "location": { "latitude": 34.0, "longitude": -118.0 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 1秒で期限切れ、1秒間隔のスイープで削除される
    let mut evicted = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if server.state().index.get("driver-gone").await.unwrap().is_none() {
            evicted = true;
            break;
        }
    }
    assert!(evicted, "stale driver was not evicted");
    assert_eq!(server.state().index.stats().evicted, 1);

    server.stop().await.unwrap();
}
