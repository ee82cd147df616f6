//! Driver Locator Server Entry Point

use std::process::ExitCode;

use clap::Parser;
use driver_locator::{cli::Cli, logging, server, AppState};
use driver_locator_common::config::LocatorConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ロギング初期化前なので標準エラーに出す
    let config = match LocatorConfig::load(cli.config.as_deref()) {
        Ok(config) => cli.apply(config),
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let _logging_guard = match logging::init(config.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Driver Locator v{}", env!("CARGO_PKG_VERSION"));

    let bind_addr = config.bind_addr();
    let state = AppState::new(config);

    match server::run(state, &bind_addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(bind_addr = %bind_addr, error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
