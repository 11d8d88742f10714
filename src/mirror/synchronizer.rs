// ABOUTME: Synchronizer - one cold pass that brings the mirror up to date
// ABOUTME: New tables are exported outright; mirrored tables go through the change detector

use anyhow::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Instant;

use super::detector::{ChangeDetector, Refresh, RowCountComparator, Staleness};
use super::executor::{ExportExecutor, ExportJob};
use super::inventory::take_inventory;
use super::layout::MirrorLayout;
use super::progress::{Progress, StdoutProgress};
use crate::engine::QueryEngine;
use crate::storage::BlobStore;

/// What a single run did.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub new_tables: Vec<String>,
    pub existing_tables: Vec<String>,
    /// Jobs submitted, for new and stale tables alike.
    pub exported: Vec<ExportJob>,
    /// Mirrored tables whose marker matched the live count.
    pub skipped: Vec<String>,
    pub duration_ms: u64,
}

impl SyncReport {
    pub fn exported_tables(&self) -> Vec<&str> {
        self.exported.iter().map(|job| job.table.as_str()).collect()
    }
}

enum Task {
    New(String),
    Existing(String),
}

enum Outcome {
    Exported(ExportJob),
    Skipped(String),
}

/// Mirrors every table of one dataset into one bucket namespace.
///
/// Runs hold no state between invocations: each run re-derives which tables
/// are new from the two listings. Nothing is retried; the first failing
/// remote call aborts the run, and re-running is safe because every
/// per-table step is idempotent.
pub struct Synchronizer<'a, E: ?Sized, S: ?Sized> {
    engine: &'a E,
    store: &'a S,
    layout: MirrorLayout,
    staleness: Box<dyn Staleness>,
    progress: Box<dyn Progress>,
    concurrency: usize,
}

impl<'a, E, S> Synchronizer<'a, E, S>
where
    E: QueryEngine + ?Sized,
    S: BlobStore + ?Sized,
{
    pub fn new(engine: &'a E, store: &'a S, layout: MirrorLayout) -> Self {
        Self {
            engine,
            store,
            layout,
            staleness: Box::new(RowCountComparator),
            progress: Box::new(StdoutProgress),
            concurrency: 1,
        }
    }

    /// Replace the row-count comparison used for mirrored tables.
    pub fn with_staleness(mut self, staleness: impl Staleness + 'static) -> Self {
        self.staleness = Box::new(staleness);
        self
    }

    /// Receive the status lines instead of printing them to stdout.
    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Process up to `concurrency` tables at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let start = Instant::now();

        let inventory = take_inventory(self.engine, self.store, &self.layout).await?;
        let progress = &*self.progress;
        progress.report(&format!("new tables: {:?}", inventory.new_datasets));
        progress.report(&format!("existing tables: {:?}", inventory.existing_datasets));

        let executor = ExportExecutor::new(self.engine, self.store, &self.layout);
        let detector =
            ChangeDetector::new(self.engine, self.store, &self.layout, &*self.staleness)
                .with_progress(progress);
        let executor = &executor;
        let detector = &detector;

        let tasks = inventory
            .new_datasets
            .iter()
            .cloned()
            .map(Task::New)
            .chain(inventory.existing_datasets.iter().cloned().map(Task::Existing));

        // buffered() keeps results in task order while running up to N at once
        let outcomes: Vec<Outcome> = stream::iter(tasks)
            .map(move |task| process(task, executor, detector, progress))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut report = SyncReport {
            new_tables: inventory.new_datasets,
            existing_tables: inventory.existing_datasets,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Exported(job) => report.exported.push(job),
                Outcome::Skipped(table) => report.skipped.push(table),
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }
}

async fn process<E, S>(
    task: Task,
    executor: &ExportExecutor<'_, E, S>,
    detector: &ChangeDetector<'_, E, S>,
    progress: &dyn Progress,
) -> Result<Outcome>
where
    E: QueryEngine + ?Sized,
    S: BlobStore + ?Sized,
{
    match task {
        Task::New(table) => {
            progress.report(&format!("backing up new table: {}", table));
            Ok(Outcome::Exported(executor.export(&table).await?))
        }
        Task::Existing(table) => {
            progress.report(&format!("processing existing table: {}", table));
            match detector.refresh(&table, executor).await? {
                Refresh::Skipped => Ok(Outcome::Skipped(table)),
                Refresh::Exported(job) => Ok(Outcome::Exported(job)),
            }
        }
    }
}
