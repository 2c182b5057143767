//! Tail Demo Web Server
//!
//! Run with: cargo run -p tail-web -- --config tail.toml

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tail_web::config::{Config, FeedKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tail-web", about = "Live tag map for the Tail demo")]
struct Args {
    /// Configuration file (default: $TAIL_CONFIG or ./tail.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides server.bind
    #[arg(short, long, env = "TAIL_BIND")]
    bind: Option<String>,

    /// Tag feed to use, overrides feed.kind
    #[arg(short, long, value_enum)]
    feed: Option<FeedKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(kind) = args.feed {
        config.feed.kind = kind;
    }
    config.validate()?;

    info!("Starting Tail Demo web server...");

    // Create app state and start the feed
    let source = tail_web::feed::build_source(&config.feed, &config.map)?;
    let state = Arc::new(tail_web::state::AppState::new(&config, source.name()));
    let _feed = tail_web::feed::spawn_feed(state.clone(), source);

    // Build router
    let app = tail_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
