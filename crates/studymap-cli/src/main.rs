//! # Studymap CLI Entry Point
//!
//! Main binary for the studymap demo deployment.
//!
//! ## Usage
//!
//! ```bash
//! # Start the orchestrator service
//! studymap serve -b 0.0.0.0:8080 --external-url http://127.0.0.1:9090
//!
//! # Start the simulated external collaborator
//! studymap external -b 0.0.0.0:9090
//! ```
//!
//! The external URL must include the `http://` prefix. Unrecoverable
//! startup errors (bad address, bind failure) terminate the process;
//! per-request errors never do.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use argh::FromArgs;
use studymap_client::ExternalClient;
use studymap_external::ExternalApp;
use studymap_metrics::MetricsRegistry;
use studymap_server::{HttpServer, Orchestrator};
use studymap_store::{demo_router, IoPool};

/// studymap - fan-out/merge study service with live status streaming
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeCmd),
    External(ExternalCmd),
}

/// Start the orchestrator service.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
struct ServeCmd {
    /// address to bind (e.g. 0.0.0.0:8080)
    #[argh(option, short = 'b', default = "\"127.0.0.1:8080\".parse().unwrap()")]
    bind: SocketAddr,

    /// base URL of the external study service
    #[argh(option, default = "String::from(\"http://127.0.0.1:9090\")")]
    external_url: String,

    /// size of the blocking worker pool
    #[argh(option, default = "4")]
    io_threads: usize,
}

/// Start the simulated external collaborator.
#[derive(FromArgs)]
#[argh(subcommand, name = "external")]
struct ExternalCmd {
    /// address to bind (e.g. 0.0.0.0:9090)
    #[argh(option, short = 'b', default = "\"127.0.0.1:9090\".parse().unwrap()")]
    bind: SocketAddr,
}

fn validate_http_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Invalid external URL: '{}' must start with http:// or https://",
            url
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli: Cli = argh::from_env();
    match cli.command {
        Commands::Serve(cmd) => serve(cmd).await,
        Commands::External(cmd) => cmd_external(cmd).await,
    }
}

async fn serve(cmd: ServeCmd) -> Result<()> {
    validate_http_url(&cmd.external_url)?;

    let metrics = Arc::new(MetricsRegistry::new());
    let io_pool = Arc::new(IoPool::new("io-worker", cmd.io_threads));
    let external = Arc::new(ExternalClient::new(cmd.external_url, Arc::clone(&metrics)));
    let store = Arc::new(demo_router(Arc::clone(&io_pool)));
    let orchestrator = Arc::new(Orchestrator::new(metrics, external, store, io_pool));

    HttpServer::new(orchestrator).run(cmd.bind).await?;
    Ok(())
}

async fn cmd_external(cmd: ExternalCmd) -> Result<()> {
    ExternalApp::new().run(cmd.bind).await?;
    Ok(())
}
