//! Foodmap - restaurant discovery and food-logging backend
//!
//! An HTTP service for browsing restaurants near campus, recording
//! AI-generated nutrition analyses of described meals, and serving
//! collection-wide statistics.

mod ai;
mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod server;
mod store;

use ai::{AiConfig, NutritionAnalyzer};
use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use server::AppState;
use std::sync::Arc;
use store::{StoreConfig, StoreHandle};
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Foodmap v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    run_server(args).await
}

/// Handle --init-config: generate a default .foodmap.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".foodmap.toml");

    if path.exists() {
        eprintln!("⚠️  .foodmap.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .foodmap.toml")?;

    println!("✅ Created .foodmap.toml with default settings.");
    println!("   Edit it to customize the bind address, store backend, and AI model.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration, open the store, and serve the router.
async fn run_server(args: Args) -> Result<()> {
    // Load config: explicit path first, then the default location.
    let mut config = if let Some(ref path) = args.config {
        Config::load(path)?
    } else {
        Config::load_default()?.unwrap_or_default()
    };
    config.merge_with_args(&args);

    let analyzer = NutritionAnalyzer::new(AiConfig {
        api_url: config.ai.api_url.clone(),
        model: config.ai.model.clone(),
        api_key: args.ai_key.clone(),
        temperature: config.ai.temperature,
        max_tokens: config.ai.max_tokens,
        timeout_seconds: config.ai.timeout_seconds,
    })?;

    let handle = StoreHandle::new(StoreConfig {
        backend: config.store.backend.clone(),
    });
    let store = handle
        .get()
        .await
        .context("Failed to open the backing store")?;

    let state = Arc::new(AppState { store, analyzer });
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Listening on {}", config.server.bind);

    axum::serve(listener, app)
        .await
        .context("HTTP server exited with an error")?;

    Ok(())
}
