//! 設定管理
//!
//! LocatorConfig等の設定構造体
//!
//! Values come from (lowest to highest precedence) the serde defaults below,
//! an optional TOML file, and `DRIVER_LOCATOR_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CommonError;

/// Prefix of the environment variables read by [`LocatorConfig::load`].
pub const ENV_PREFIX: &str = "DRIVER_LOCATOR";

/// Smallest accepted grid cell edge, in degrees (about 110 m at the equator).
pub const MIN_GRID_CELL_DEGREES: f64 = 0.001;

/// Largest accepted grid cell edge, in degrees.
pub const MAX_GRID_CELL_DEGREES: f64 = 90.0;

/// What a radius search returns when the store fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryErrorPolicy {
    /// Log the failure and answer with an empty result (fail-open)
    #[default]
    Empty,
    /// Return the storage error to the caller
    Propagate,
}

/// Internal indexing strategy of the location store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexStrategy {
    /// Fixed-size latitude/longitude cells
    #[default]
    Grid,
    /// Linear scan over every record
    Scan,
}

/// Locator server設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocatorConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 50051)
    #[serde(default = "default_port")]
    pub port: u16,

    /// 検索失敗時の挙動 (デフォルト: empty)
    #[serde(default)]
    pub on_query_error: QueryErrorPolicy,

    /// インデックス方式 (デフォルト: grid)
    #[serde(default)]
    pub index_strategy: IndexStrategy,

    /// グリッドセルの一辺（度）(デフォルト: 0.1)
    #[serde(default = "default_grid_cell_degrees")]
    pub grid_cell_degrees: f64,

    /// 位置更新が途絶えたエージェントを削除するまでの秒数。0で無効 (デフォルト: 0)
    #[serde(default)]
    pub stale_after_secs: u64,

    /// 期限切れスイープ間隔（秒）(デフォルト: 30)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// ログファイル出力先ディレクトリ（未指定なら標準出力のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    50051
}

fn default_grid_cell_degrees() -> f64 {
    0.1
}

fn default_sweep_interval() -> u64 {
    30
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            on_query_error: QueryErrorPolicy::default(),
            index_strategy: IndexStrategy::default(),
            grid_cell_degrees: default_grid_cell_degrees(),
            stale_after_secs: 0,
            sweep_interval_secs: default_sweep_interval(),
            log_dir: None,
        }
    }
}

impl LocatorConfig {
    /// Loads the configuration from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, CommonError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), CommonError> {
        let cell_range = MIN_GRID_CELL_DEGREES..=MAX_GRID_CELL_DEGREES;
        if !cell_range.contains(&self.grid_cell_degrees) {
            return Err(CommonError::Config(format!(
                "grid_cell_degrees must be in [{}, {}], got {}",
                MIN_GRID_CELL_DEGREES, MAX_GRID_CELL_DEGREES, self.grid_cell_degrees
            )));
        }
        if self.sweep_interval_secs == 0 {
            return Err(CommonError::Config(
                "sweep_interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the stale-record sweeper should run.
    pub fn eviction_enabled(&self) -> bool {
        self.stale_after_secs > 0
    }
}
