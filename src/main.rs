//! CORS Proxy
//!
//! Relays a caller-specified target URL through a single endpoint and adds
//! CORS headers, so browser clients can read third-party resources.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request  GET /?https%3A%2F%2Fapi.example.com%2Fdata
//!     ───────────────────────────┐
//!                                ▼
//!                         ┌─────────────┐  origin not allowed
//!                         │ cors origin │──────────────────────▶ 301 RedirectTarget
//!                         └──────┬──────┘
//!                                ▼
//!                         ┌─────────────┐  OPTIONS
//!                         │ dispatcher  │──────────────────────▶ 204 preflight
//!                         └──────┬──────┘  other methods
//!                                │─────────────────────────────▶ 405
//!                                ▼ GET / POST / HEAD
//!                         ┌─────────────┐
//!                         │  forwarder  │──────────────────────▶ Target server
//!                         └──────┬──────┘
//!                                ▼
//!     Client Response  + Access-Control-Allow-Origin, Vary: Origin
//! ```

use std::path::PathBuf;

use clap::Parser;

use cors_proxy::config::{load_config, ConfigOverrides};
use cors_proxy::lifecycle;
use cors_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "cors-proxy")]
#[command(about = "CORS proxy for allow-listed browser origins", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "CORS_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated hostnames accepted as origins.
    #[arg(long, env = "ALLOWED_HOSTS")]
    allowed_hosts: Option<String>,

    /// Where callers with a disallowed origin are redirected.
    #[arg(long, env = "REDIRECT_URL")]
    redirect_url: Option<String>,

    /// Listener bind address.
    #[arg(long, env = "CORS_PROXY_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        allowed_hosts: cli.allowed_hosts,
        redirect_url: cli.redirect_url,
        bind_address: cli.bind,
    };
    let config = load_config(cli.config.as_deref(), &overrides)?;

    logging::init(&config.observability);

    tracing::info!("cors-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_hosts = %config.cors.allowed_hosts,
        redirect_url = %config.cors.redirect_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    lifecycle::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
