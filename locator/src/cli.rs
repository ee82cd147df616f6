//! CLI module for driver-locator
//!
//! Only startup options live here; everything else comes from the config
//! file and `DRIVER_LOCATOR_*` environment variables.

use std::path::PathBuf;

use clap::Parser;
use driver_locator_common::config::LocatorConfig;

/// Driver Locator - real-time driver positions and radius search
#[derive(Parser, Debug, Default)]
#[command(name = "driver-locator")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    DRIVER_LOCATOR_CONFIG               Config file path
    DRIVER_LOCATOR_HOST                 Bind address (default: 0.0.0.0)
    DRIVER_LOCATOR_PORT                 Listen port (default: 50051)
    DRIVER_LOCATOR_ON_QUERY_ERROR       empty | propagate (default: empty)
    DRIVER_LOCATOR_INDEX_STRATEGY       grid | scan (default: grid)
    DRIVER_LOCATOR_GRID_CELL_DEGREES    Grid cell size in degrees (default: 0.1)
    DRIVER_LOCATOR_STALE_AFTER_SECS     Evict agents idle this long, 0 = never (default: 0)
    DRIVER_LOCATOR_SWEEP_INTERVAL_SECS  Eviction sweep interval (default: 30)
    DRIVER_LOCATOR_LOG_DIR              Also write logs to this directory
    RUST_LOG                            Log filter (default: info)
"#)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "DRIVER_LOCATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Applies command line overrides on top of a loaded configuration.
    pub fn apply(&self, mut config: LocatorConfig) -> LocatorConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}
