use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use drinks_api::config::AppConfig;
use drinks_api::drinks::SqliteDrinkRepository;
use drinks_api::{router, AppState, ResourceServer};

#[derive(Parser, Debug)]
#[command(name = "drinks-api", version, about = "Coffee shop drinks API")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "DRINKS_CONFIG", default_value = "config.toml")]
    config: String,

    /// Override the listen address from the configuration
    #[arg(long, env = "DRINKS_BIND")]
    bind: Option<String>,

    /// Drop and recreate the drink table before serving
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drinks_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;
    config.validate()?;

    let repo = SqliteDrinkRepository::connect(&config.database.url, config.database.max_connections)
        .await
        .context("opening database")?;
    if args.reset_db {
        repo.reset_schema().await?;
    } else {
        repo.init_schema().await?;
    }

    let rs_config = config.auth.to_resource_server_config()?;
    tracing::info!(
        jwks_url = %rs_config.jwks_url,
        issuer = %rs_config.issuer,
        audience = %rs_config.audience,
        "verifying tokens"
    );
    let resource_server = ResourceServer::new(&rs_config)?;

    let state = AppState::new(Arc::new(repo), resource_server);
    let app = router(state);

    let bind_addr = args.bind.unwrap_or(config.server.bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    tracing::info!("listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
