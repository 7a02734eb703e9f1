//! melodex-ingest - NDJSON track feed loader
//!
//! Reads a feed file line by line, applies fixed-size batches through the
//! ingest pipeline one at a time, then rebuilds the per-year aggregate
//! once at end of run.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use melodex_common::config::resolve_database_path;
use melodex_common::db::init_database;
use melodex_ingest::ndjson::BatchReader;
use melodex_ingest::pipeline::IngestService;

/// Command-line arguments for melodex-ingest
#[derive(Parser, Debug)]
#[command(name = "melodex-ingest")]
#[command(about = "Load an NDJSON track feed into the melodex database")]
#[command(version)]
struct Args {
    /// Path to the NDJSON feed file
    feed: PathBuf,

    /// Database file (defaults to MELODEX_DATABASE, config file, then the platform default)
    #[arg(short, long)]
    database: Option<String>,

    /// Records per ingest batch
    #[arg(short, long, default_value = "800", env = "MELODEX_BATCH_SIZE")]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "melodex_ingest=info,melodex_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let db_path = resolve_database_path(args.database.as_deref())?;
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    let service = IngestService::new(pool.clone());
    let started = Instant::now();

    info!(
        "Ingesting {} in batches of {}",
        args.feed.display(),
        args.batch_size
    );

    let mut reader = BatchReader::open(&args.feed, args.batch_size).await?;
    let mut records_total: u64 = 0;
    let mut batches: u64 = 0;
    let mut affected_total: u64 = 0;

    while let Some(batch) = reader.next_batch().await? {
        let affected = service.ingest_batch(&batch).await?;
        batches += 1;
        records_total += batch.len() as u64;
        affected_total += affected;
    }

    let aggregate_rows = service.rebuild_aggregates().await?;

    info!(
        "Feed complete: {} records in {} batches, {} rows affected, {} aggregate rows, {:.2}s elapsed",
        records_total,
        batches,
        affected_total,
        aggregate_rows,
        started.elapsed().as_secs_f64()
    );

    pool.close().await;
    Ok(())
}
