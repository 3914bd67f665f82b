//! Class sessions service.
//!
//! Loads configuration, installs tracing, wires the handlers onto the
//! in-process bus and runs until Ctrl-C.

use class_sessions::app::ClassSessionsApp;
use class_sessions::config::AppConfig;
use class_sessions::telemetry::init_tracing;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.service)?;
    info!(environment = ?config.service.environment, "Starting class sessions service");

    let app = ClassSessionsApp::build(&config)?;

    signal::ctrl_c().await?;
    info!(
        published_events = app.bus.event_count(),
        "Shutdown signal received, stopping"
    );

    Ok(())
}
