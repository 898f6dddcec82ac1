//! topolinkd daemon entry point.
//!
//! Initializes logging and prepares the discovery wiring. The
//! southbound device session (the [`DeviceReader`] implementation
//! talking the management protocol) is provided by the transport
//! integration layer.

use std::process::ExitCode;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

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

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("--- Starting topolinkd ---");

    // Mount notifications from the device session layer drive
    // discover_neighbor_links per node; nothing to do without a
    // session.
    info!("topolinkd ready; waiting for device sessions");

    ExitCode::SUCCESS
}
