// ABOUTME: Export executor - refreshes the row-count marker and submits a full export
// ABOUTME: The export job is fire-and-forget; completion is the query engine's concern

use anyhow::{Context, Result};
use uuid::Uuid;

use super::layout::MirrorLayout;
use crate::engine::QueryEngine;
use crate::storage::BlobStore;

/// Handle for a submitted export job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub job_id: String,
    pub table: String,
    pub destination_uri: String,
    /// Row count written to the marker just before submission.
    pub rows: String,
}

pub struct ExportExecutor<'a, E: ?Sized, S: ?Sized> {
    engine: &'a E,
    store: &'a S,
    layout: &'a MirrorLayout,
}

impl<'a, E, S> ExportExecutor<'a, E, S>
where
    E: QueryEngine + ?Sized,
    S: BlobStore + ?Sized,
{
    pub fn new(engine: &'a E, store: &'a S, layout: &'a MirrorLayout) -> Self {
        Self {
            engine,
            store,
            layout,
        }
    }

    /// Back up `table`: overwrite its marker with the live row count, then
    /// submit an export of the whole table to its data object.
    ///
    /// Safe to repeat. Each call overwrites the marker and submits a new job
    /// under a fresh id; the export replaces the data object in full. A reader
    /// can observe the new marker before the export job has finished.
    pub async fn export(&self, table: &str) -> Result<ExportJob> {
        let rows = self
            .engine
            .count_rows(table)
            .await
            .with_context(|| format!("Failed to count rows of '{}'", table))?;

        let marker_path = self.layout.marker_path(table);
        self.store
            .write_object(&marker_path, &rows)
            .await
            .with_context(|| format!("Failed to write row-count marker {}", marker_path))?;

        let job_id = Uuid::new_v4().to_string();
        let destination_uri = self.layout.data_uri(table);
        self.engine
            .submit_export(table, &destination_uri, &job_id)
            .await
            .with_context(|| format!("Failed to submit export of '{}' to {}", table, destination_uri))?;

        tracing::debug!("Export job {} submitted for {} ({} rows)", job_id, table, rows);

        Ok(ExportJob {
            job_id,
            table: table.to_string(),
            destination_uri,
            rows,
        })
    }
}
