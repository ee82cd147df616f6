//! Driver Locator Server
//!
//! ドライバーの現在位置を保持し、半径検索に応答する位置情報サーバー

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// CLIインターフェース
pub mod cli;

/// 地理計算（haversine距離、バウンディングボックス）
pub mod geo;

/// 位置インデックス
pub mod index;

/// ロギング初期化ユーティリティ
pub mod logging;

/// axumサーバー起動・シャットダウン
pub mod server;

/// シャットダウン制御
pub mod shutdown;

/// 期限切れエージェントのスイーパー
pub mod sweeper;

use std::sync::Arc;

use driver_locator_common::config::LocatorConfig;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 位置インデックス
    pub index: index::LocationIndex,
    /// 起動時の設定
    pub config: Arc<LocatorConfig>,
    /// シャットダウン制御
    pub shutdown: shutdown::ShutdownController,
}

impl AppState {
    /// Builds the state and the index described by `config`.
    pub fn new(config: LocatorConfig) -> Self {
        let index = index::LocationIndex::from_config(&config);
        Self::with_index(index, config)
    }

    /// Builds the state around an existing index.
    pub fn with_index(index: index::LocationIndex, config: LocatorConfig) -> Self {
        Self {
            index,
            config: Arc::new(config),
            shutdown: shutdown::ShutdownController::default(),
        }
    }
}
