//! portmapd daemon entry point.
//!
//! Initializes logging, loads configuration, and prepares the builder
//! wiring. The southbound device session (the [`DeviceReader`]
//! implementation talking the management protocol) is provided by the
//! transport integration layer.

use std::process::ExitCode;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use portmapd::PortmapConfig;

/// Default configuration file location.
const DEFAULT_CONFIG_PATH: &str = "/etc/portmapd/portmapd.toml";

/// Initialize tracing/logging.
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn load_config() -> Result<PortmapConfig, portmapd::ConfigError> {
    let path = std::env::var("PORTMAPD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = if std::path::Path::new(&path).exists() {
        PortmapConfig::from_file(&path)?
    } else {
        info!("No config file at {}, using defaults", path);
        PortmapConfig::default()
    };
    config.with_env_overrides()
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("--- Starting portmapd ---");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("portmapd configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Probing up to {} degrees and {} SRGs per node, {}ms read timeout",
        config.max_degrees,
        config.max_srgs,
        config.read_timeout_ms
    );

    // Mount notifications from the device session layer drive
    // build_mapping per node; nothing to do without a session.
    info!("portmapd ready; waiting for device sessions");

    ExitCode::SUCCESS
}
