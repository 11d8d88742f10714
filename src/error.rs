// ABOUTME: Typed error kinds for dataset mirroring
// ABOUTME: Carried inside anyhow::Error so callers can downcast when they need to tell kinds apart

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MirrorError {
    /// A dataset classified as existing has no row-count marker in the mirror.
    #[error("row-count marker missing at {path}; the mirror for '{dataset}' is corrupted or was altered by hand")]
    MissingMarker { dataset: String, path: String },

    /// A service answered with a payload of an unexpected shape.
    #[error("malformed {service} response: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("{service} rejected the credentials (HTTP {status}). Refresh GOOGLE_OAUTH_ACCESS_TOKEN or set access_token in the config file")]
    Unauthorized { service: &'static str, status: u16 },
}

impl MirrorError {
    pub fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        MirrorError::MalformedResponse {
            service,
            detail: detail.into(),
        }
    }
}

/// Returns true when the error chain contains a [`MirrorError::NotFound`].
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<MirrorError>(), Some(MirrorError::NotFound(_))))
}
