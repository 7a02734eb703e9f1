//! melodex-api - album statistics HTTP service
//!
//! Serves keyset-paginated album statistics from a melodex database
//! populated by melodex-ingest.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use melodex_api::{build_router, AppState};
use melodex_common::config::resolve_database_path;
use melodex_common::db::init_database;

/// Command-line arguments for melodex-api
#[derive(Parser, Debug)]
#[command(name = "melodex-api")]
#[command(about = "Serve keyset-paginated album statistics over HTTP")]
#[command(version)]
struct Args {
    /// Database file (defaults to MELODEX_DATABASE, config file, then the platform default)
    #[arg(short, long)]
    database: Option<String>,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:5720", env = "MELODEX_BIND")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "melodex_api=info,melodex_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let db_path = resolve_database_path(args.database.as_deref())?;
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("melodex-api listening on http://{}", args.bind);
    info!("Health check: http://{}/health", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
