//! Trellis web core.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (axum adapter) ──▶ message (Environment → ServerRequest)
//!                                                   │
//!                                                   ▼
//!                      container ──resolves──▶ routing (Kernel → Router → Handler)
//!                                                   │
//!     Client Response                               ▼
//!     ◀────────────── http (render) ◀────────── message (Response)
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use trellis::config::{load_config, AppConfig};
use trellis::lifecycle::start;
use trellis::message::{Environment, HttpMessage};
use trellis::observability::init_logging;
use trellis::HttpServer;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Minimal web core: routing, autowiring and immutable HTTP messages", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve HTTP on the configured bind address
    Serve,
    /// Dispatch a single request and print the response body
    Call {
        /// Request method, e.g. GET
        method: String,
        /// Request target, path and optional query
        target: String,
        /// Request header as "name: value"; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Request body
        #[arg(long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    init_logging(&config.observability)?;

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Call {
            method,
            target,
            headers,
            body,
        } => call(&config, &method, &target, &headers, body),
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("trellis v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        base_path = %config.routing.base_path,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let app = start(&config)?;
    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(app).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn call(
    config: &AppConfig,
    method: &str,
    target: &str,
    headers: &[String],
    body: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = start(config)?;

    let mut env = Environment::new(method, target);
    env.scheme = config.server.public_scheme.clone();
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("Invalid header '{header}', expected 'name: value'"))?;
        env.headers.push((name.trim().to_string(), value.trim().to_string()));
    }
    env.body = body.map(String::into_bytes).unwrap_or_default();

    let response = app.handle_environment(env)?;
    eprintln!(
        "HTTP/{} {} {}",
        response.protocol_version(),
        response.status_code(),
        response.reason_phrase()
    );

    let mut stdout = std::io::stdout().lock();
    response.render_with_chunk_size(&mut stdout, app.chunk_size())?;
    writeln!(stdout)?;
    Ok(())
}
