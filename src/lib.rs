// ABOUTME: Library root for dataset-mirror
// ABOUTME: Exposes the synchronizer, its service capabilities, and their Google API clients

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod mirror;
pub mod storage;

pub use config::MirrorConfig;
pub use engine::{BigQueryClient, QueryEngine};
pub use error::MirrorError;
pub use mirror::{MirrorLayout, SyncReport, Synchronizer};
pub use storage::{BlobStore, CloudStorageClient};
