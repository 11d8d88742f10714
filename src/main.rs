// ABOUTME: CLI entry point for dataset-mirror
// ABOUTME: Mirrors one BigQuery dataset into Cloud Storage in a single pass

use anyhow::Context;
use clap::Parser;
use dataset_mirror::{BigQueryClient, CloudStorageClient, MirrorConfig, MirrorLayout, Synchronizer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dataset-mirror")]
#[command(about = "Back up append-only BigQuery tables to Cloud Storage", long_about = None)]
#[command(version)]
struct Cli {
    /// Google Cloud project that owns the dataset (also the default bucket)
    project: String,
    /// BigQuery dataset whose tables are mirrored
    dataset: String,
    /// Set the log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log: String,
    /// Path to a config.toml (defaults to ~/.dataset-mirror/config.toml when present)
    #[arg(long = "config")]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --log
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log.clone()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = MirrorConfig::load(&cli.project, &cli.dataset, cli.config_path.as_deref())
        .context("Failed to load configuration")?;
    if config.access_token.is_none() {
        tracing::warn!(
            "No access token configured; requests are sent unauthenticated. Set {} or access_token in the config file",
            dataset_mirror::config::ACCESS_TOKEN_ENV
        );
    }

    tracing::info!("Source: {}:{}", config.project_id, config.dataset_id);
    tracing::info!("Mirror: gs://{}/{}/", config.bucket, config.dataset_id);

    let engine = BigQueryClient::new(
        Some(config.bigquery_api.as_str()),
        config.project_id.clone(),
        config.dataset_id.clone(),
        config.access_token.clone(),
        config.timeout,
    )?;
    let store = CloudStorageClient::new(
        Some(config.storage_api.as_str()),
        config.bucket.clone(),
        config.access_token.clone(),
        config.timeout,
    )?;
    let layout = MirrorLayout::new(config.bucket.clone(), config.dataset_id.clone());

    let report = Synchronizer::new(&engine, &store, layout)
        .with_concurrency(config.concurrency)
        .run()
        .await?;

    println!();
    println!("========================================");
    println!("Mirror pass complete");
    println!("========================================");
    println!("  New tables: {}", report.new_tables.len());
    println!("  Existing tables: {}", report.existing_tables.len());
    println!("  Export jobs submitted: {}", report.exported.len());
    for job in &report.exported {
        println!("    - {} ({} rows) job {}", job.table, job.rows, job.job_id);
    }
    println!("  Unchanged tables skipped: {}", report.skipped.len());
    println!("  Duration: {}ms", report.duration_ms);

    Ok(())
}
