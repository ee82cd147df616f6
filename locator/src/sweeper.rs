//! 期限切れエージェントのスイーパー
//!
//! Periodically removes agents that stopped sending positions. This task is
//! the only caller of [`LocationIndex::evict_stale`]; it is not started when
//! `stale_after_secs` is 0.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info};

use crate::index::LocationIndex;
use crate::shutdown::ShutdownController;

/// デフォルトのスイープ間隔（秒）
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Background eviction of stale agent records.
#[derive(Clone)]
pub struct StaleAgentSweeper {
    /// 位置インデックス
    index: LocationIndex,
    /// この時間更新がないエージェントを削除
    max_age: Duration,
    /// スイープ間隔
    sweep_interval: Duration,
}

impl StaleAgentSweeper {
    /// 新しいスイーパーを作成
    pub fn new(index: LocationIndex, max_age: Duration) -> Self {
        Self {
            index,
            max_age,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    /// スイープ間隔を設定
    pub fn with_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Runs one eviction pass and returns the number of removed agents.
    pub async fn sweep_once(&self) -> usize {
        let max_age = match chrono::Duration::from_std(self.max_age) {
            Ok(max_age) => max_age,
            Err(e) => {
                error!(error = %e, "Stale age out of range, skipping sweep");
                return 0;
            }
        };

        match self.index.evict_stale(max_age).await {
            Ok(removed) => removed,
            Err(e) => {
                error!(error = %e, "Stale agent sweep failed");
                0
            }
        }
    }

    /// バックグラウンドでスイープを開始
    ///
    /// The loop exits once `shutdown` fires.
    pub fn start(self, shutdown: ShutdownController) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.sweep_loop(shutdown).await;
        })
    }

    async fn sweep_loop(&self, shutdown: ShutdownController) {
        let mut timer = interval(self.sweep_interval);

        info!(
            interval_secs = self.sweep_interval.as_secs(),
            max_age_secs = self.max_age.as_secs(),
            "Stale agent sweeper started"
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.sweep_once().await;
                }
                _ = shutdown.wait() => {
                    info!("Stale agent sweeper stopped");
                    return;
                }
            }
        }
    }
}
