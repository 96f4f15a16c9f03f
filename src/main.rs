//! `pointlink` binary: serves a serial device's coordinate stream over HTTP.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pointlink::Bridge;
use pointlink::link::DecodeMode;
use pointlink::transport::SerialSettings;

// ============================================================================
// Args
// ============================================================================

/// Serial-to-HTTP coordinate bridge
#[derive(Parser, Debug)]
#[command(name = "pointlink")]
#[command(version, about, long_about = None)]
struct Args {
    /// HTTP bind address
    #[arg(long, default_value = "localhost:8080")]
    addr: String,

    /// Directory served for non-API paths
    #[arg(long, default_value = "./static")]
    static_dir: PathBuf,

    /// Serial port to open (default: first detected port)
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Decode records when a client polls instead of on every read
    #[arg(long)]
    decode_on_poll: bool,

    /// Generate a sine wave instead of reading a serial port
    #[arg(long)]
    mock: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

// ============================================================================
// Functions
// ============================================================================

/// Installs the tracing subscriber. `RUST_LOG` overrides the default filter.
fn init_logging(debug: bool) {
    let filter = if debug { "pointlink=debug" } else { "pointlink=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

/// Resolves on Ctrl+C.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Interrupt received, shutting down");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let mut serial = SerialSettings::new().with_baud_rate(args.baud);
    if let Some(port) = args.port {
        serial = serial.with_port(port);
    }

    let decode_mode = if args.decode_on_poll {
        DecodeMode::OnPoll
    } else {
        DecodeMode::OnRead
    };

    let mut builder = Bridge::builder()
        .addr(args.addr)
        .static_dir(args.static_dir)
        .serial(serial)
        .decode_mode(decode_mode);
    if args.mock {
        builder = builder.mock();
    }

    let result = match builder.build() {
        Ok(bridge) => bridge.run(ctrl_c()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Bridge failed");
            ExitCode::FAILURE
        }
    }
}
