// ABOUTME: Query engine capability used by the synchronizer
// ABOUTME: Lists tables, counts rows, and submits fire-and-forget export jobs

mod bigquery;
pub mod models;

pub use bigquery::{BigQueryClient, DEFAULT_BIGQUERY_API_URL};

use anyhow::Result;
use async_trait::async_trait;

/// The source side of the mirror.
///
/// Row counts are returned exactly as the engine reports them, as decimal
/// strings, and are never parsed.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Names of every table in the configured dataset.
    async fn list_datasets(&self) -> Result<Vec<String>>;

    /// Current row count of `table`.
    async fn count_rows(&self, table: &str) -> Result<String>;

    /// Submit an export of the full table to `destination_uri`.
    ///
    /// Returns once the job is accepted; completion is not awaited.
    async fn submit_export(&self, table: &str, destination_uri: &str, job_id: &str)
        -> Result<()>;
}
