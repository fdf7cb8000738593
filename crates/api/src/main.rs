use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use commissary_api::app::{build_app, AppServices};
use commissary_api::config::{log_format_from_env, ApiConfig};
use commissary_infra::{bootstrap, Database};

#[derive(Debug, Parser)]
#[command(name = "commissary-api", version, about = "Jail commissary and property inventory service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create the schema and seed the default accounts on an empty database.
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commissary_observability::init(log_format_from_env());

    let config = ApiConfig::from_env()?;
    info!(?config, "configuration loaded");

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    db.migrate().await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Init => init(&db).await?,
        Command::Serve => serve(db.clone(), &config).await?,
    }

    db.close().await;
    Ok(())
}

async fn init(db: &Database) -> anyhow::Result<()> {
    let created = bootstrap::seed_default_users(db.pool())
        .await
        .context("failed to seed default accounts")?;
    info!(created, "initialisation complete");
    Ok(())
}

async fn serve(db: Database, config: &ApiConfig) -> anyhow::Result<()> {
    let services = Arc::new(AppServices::new(db, &config.jwt_secret, config.token_ttl));
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
