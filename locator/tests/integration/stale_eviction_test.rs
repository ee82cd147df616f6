//! 期限切れエージェントの削除テスト

use std::time::Duration;

use driver_locator::{index::LocationIndex, shutdown::ShutdownController, sweeper::StaleAgentSweeper};
use driver_locator_common::types::{Coordinate, DistanceUnit};

fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate {
        latitude,
        longitude,
    }
}

#[tokio::test]
async fn sweeper_removes_agents_that_stop_reporting() {
    let index = LocationIndex::in_memory();
    index.upsert("quiet", coord(34.0, -118.0)).await.unwrap();

    let shutdown = ShutdownController::default();
    let handle = StaleAgentSweeper::new(index.clone(), Duration::from_millis(100))
        .with_interval(Duration::from_millis(20))
        .start(shutdown.clone());

    // 送信を続けるエージェントは残る
    for _ in 0..15 {
        index.upsert("chatty", coord(34.001, -118.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    shutdown.request_shutdown();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("sweeper did not stop")
        .expect("sweeper panicked");

    assert!(index.get("quiet").await.unwrap().is_none());
    assert!(index.get("chatty").await.unwrap().is_some());
    assert!(index.stats().evicted >= 1);

    let found = index
        .radius_search(coord(34.0, -118.0), 1.0, DistanceUnit::Miles)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].agent_id, "chatty");
}
