//! smslock directory server binary.
//!
//! # Usage
//!
//! ```bash
//! smslock-server --bind 127.0.0.1:7878 --otp changeme
//! ```

use std::sync::Arc;

use clap::Parser;
use smslock_server::{FixedOtpProvider, KeyDirectory, RequestDispatcher, serve};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// smslock directory server
#[derive(Parser, Debug)]
#[command(name = "smslock-server")]
#[command(about = "smslock directory server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    bind: String,

    /// One-time password expected from joining clients
    #[arg(long)]
    otp: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("smslock directory server starting");
    tracing::warn!("single shared one-time password configured - development use only");

    let directory = KeyDirectory::new();
    let otp = Arc::new(FixedOtpProvider::new(args.otp));
    let dispatcher = Arc::new(RequestDispatcher::new(directory, otp));

    let listener = TcpListener::bind(&args.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    serve(listener, dispatcher).await?;

    Ok(())
}
