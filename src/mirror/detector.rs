// ABOUTME: Change detector - decides whether a mirrored table is stale
// ABOUTME: Compares the stored row-count marker with the live count through a pluggable check

use anyhow::{Context, Result};

use super::executor::{ExportExecutor, ExportJob};
use super::layout::MirrorLayout;
use super::progress::{Progress, StdoutProgress};
use crate::engine::QueryEngine;
use crate::error::{is_not_found, MirrorError};
use crate::storage::BlobStore;

/// Decides staleness from the signature stored with the mirror and the live one.
///
/// The default compares row counts, which is only sound for append-only
/// tables: an in-place edit that keeps the count goes unnoticed. A content
/// digest can be plugged in instead without touching the detector.
pub trait Staleness: Send + Sync {
    fn is_stale(&self, stored: &str, live: &str) -> bool;
}

/// Treats the mirror as stale whenever the two row counts differ as strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowCountComparator;

impl Staleness for RowCountComparator {
    fn is_stale(&self, stored: &str, live: &str) -> bool {
        stored != live
    }
}

impl<F> Staleness for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn is_stale(&self, stored: &str, live: &str) -> bool {
        self(stored, live)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Unchanged { rows: String },
    Stale { stored: String, live: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    Skipped,
    Exported(ExportJob),
}

pub struct ChangeDetector<'a, E: ?Sized, S: ?Sized> {
    engine: &'a E,
    store: &'a S,
    layout: &'a MirrorLayout,
    staleness: &'a dyn Staleness,
    progress: &'a dyn Progress,
}

impl<'a, E, S> ChangeDetector<'a, E, S>
where
    E: QueryEngine + ?Sized,
    S: BlobStore + ?Sized,
{
    pub fn new(
        engine: &'a E,
        store: &'a S,
        layout: &'a MirrorLayout,
        staleness: &'a dyn Staleness,
    ) -> Self {
        Self {
            engine,
            store,
            layout,
            staleness,
            progress: &StdoutProgress,
        }
    }

    /// Send skip/update lines somewhere other than stdout.
    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Read the stored marker, fetch the live count, and compare.
    ///
    /// A missing marker is an error: the table was classified as mirrored, so
    /// its folder exists and the marker should too.
    pub async fn check(&self, table: &str) -> Result<Verdict> {
        let path = self.layout.marker_path(table);
        let stored = match self.store.read_object(&path).await {
            Ok(stored) => stored,
            Err(e) if is_not_found(&e) => {
                return Err(MirrorError::MissingMarker {
                    dataset: table.to_string(),
                    path,
                }
                .into())
            }
            Err(e) => {
                return Err(e.context(format!("Failed to read row-count marker for '{}'", table)))
            }
        };

        let live = self
            .engine
            .count_rows(table)
            .await
            .with_context(|| format!("Failed to count rows of '{}'", table))?;

        if self.staleness.is_stale(&stored, &live) {
            Ok(Verdict::Stale { stored, live })
        } else {
            Ok(Verdict::Unchanged { rows: live })
        }
    }

    /// Check `table` and hand it to `executor` if the mirror is stale.
    pub async fn refresh(
        &self,
        table: &str,
        executor: &ExportExecutor<'_, E, S>,
    ) -> Result<Refresh> {
        match self.check(table).await? {
            Verdict::Unchanged { rows } => {
                self.progress
                    .report(&format!("skipping unchanged table {} ({} rows)", table, rows));
                Ok(Refresh::Skipped)
            }
            Verdict::Stale { stored, live } => {
                self.progress.report(&format!(
                    "updating table {} (mirrored {} rows, source has {})",
                    table, stored, live
                ));
                Ok(Refresh::Exported(executor.export(table).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_comparator() {
        let cmp = RowCountComparator;
        assert!(!cmp.is_stale("123", "123"));
        assert!(cmp.is_stale("12", "123"));
        assert!(cmp.is_stale("123", "12"));
    }

    #[test]
    fn test_closure_as_staleness() {
        let never = |_: &str, _: &str| false;
        assert!(!never.is_stale("1", "2"));
    }
}
