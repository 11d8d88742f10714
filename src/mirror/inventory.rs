// ABOUTME: Inventory differ - classifies source tables as new or already mirrored
// ABOUTME: Mirror folders with no source table are ignored, never deleted

use anyhow::{Context, Result};
use std::collections::BTreeSet;

use super::layout::MirrorLayout;
use crate::engine::QueryEngine;
use crate::storage::BlobStore;

/// Result of comparing the source listing with the mirror listing.
///
/// The two lists are disjoint and together cover every source table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Tables present only in the query engine.
    pub new_datasets: Vec<String>,
    /// Tables present in both the query engine and the mirror.
    pub existing_datasets: Vec<String>,
}

impl Inventory {
    pub fn len(&self) -> usize {
        self.new_datasets.len() + self.existing_datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `source` into tables missing from `mirrored` and tables in both.
pub fn diff_inventory<I, J>(source: I, mirrored: J) -> Inventory
where
    I: IntoIterator<Item = String>,
    J: IntoIterator<Item = String>,
{
    let source: BTreeSet<String> = source.into_iter().collect();
    let mirrored: BTreeSet<String> = mirrored.into_iter().collect();

    let (existing_datasets, new_datasets): (Vec<String>, Vec<String>) = source
        .into_iter()
        .partition(|table| mirrored.contains(table));

    Inventory {
        new_datasets,
        existing_datasets,
    }
}

/// List both sides and diff them.
pub async fn take_inventory<E, S>(
    engine: &E,
    store: &S,
    layout: &MirrorLayout,
) -> Result<Inventory>
where
    E: QueryEngine + ?Sized,
    S: BlobStore + ?Sized,
{
    let mirrored = store
        .list_subfolders(&layout.namespace_prefix())
        .await
        .context("Failed to list mirrored tables")?;
    let source = engine
        .list_datasets()
        .await
        .context("Failed to list source tables")?;

    tracing::debug!(
        "{} source tables, {} mirrored folders",
        source.len(),
        mirrored.len()
    );

    Ok(diff_inventory(source, mirrored))
}
