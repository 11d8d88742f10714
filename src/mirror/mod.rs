// ABOUTME: Incremental table mirroring from a query engine into blob storage
// ABOUTME: Row counts stand in for content hashes to decide when a table must be re-exported

pub mod detector;
pub mod executor;
pub mod inventory;
pub mod layout;
pub mod progress;
pub mod synchronizer;

pub use detector::{ChangeDetector, Refresh, RowCountComparator, Staleness, Verdict};
pub use executor::{ExportExecutor, ExportJob};
pub use inventory::{diff_inventory, take_inventory, Inventory};
pub use layout::{MirrorLayout, DATA_OBJECT, MARKER_OBJECT};
pub use progress::{Progress, StdoutProgress};
pub use synchronizer::{SyncReport, Synchronizer};
