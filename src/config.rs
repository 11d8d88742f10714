// ABOUTME: Configuration for a mirroring run
// ABOUTME: Merges defaults, an optional TOML file, and environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::DEFAULT_BIGQUERY_API_URL;
use crate::storage::DEFAULT_STORAGE_API_URL;

pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
pub const BUCKET_ENV: &str = "DATASET_MIRROR_BUCKET";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub bucket: Option<String>,
    pub access_token: Option<String>,
    pub bigquery_api: Option<String>,
    pub storage_api: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub project_id: String,
    pub dataset_id: String,
    /// Destination bucket; defaults to the project id.
    pub bucket: String,
    pub access_token: Option<String>,
    pub bigquery_api: String,
    pub storage_api: String,
    pub concurrency: usize,
    pub timeout: Duration,
}

/// `~/.dataset-mirror/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dataset-mirror").join("config.toml"))
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

impl MirrorConfig {
    /// Load settings for `project_id`/`dataset_id`.
    ///
    /// An explicit `config_path` must exist; the default path is read only
    /// when present.
    pub fn load(project_id: &str, dataset_id: &str, config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => load_file_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_file_config(&path)?,
                _ => FileConfig::default(),
            },
        };

        Self::resolve(project_id, dataset_id, file, |key| std::env::var(key).ok())
    }

    /// Combine the file settings with environment lookups. Environment wins.
    pub fn resolve<F>(project_id: &str, dataset_id: &str, file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = project_id.trim();
        let dataset_id = dataset_id.trim();
        if project_id.is_empty() {
            anyhow::bail!("Project id cannot be empty");
        }
        if dataset_id.is_empty() || dataset_id.contains('/') {
            anyhow::bail!(
                "Invalid dataset id '{}': it names the mirror folder and must be a single path segment",
                dataset_id
            );
        }

        let concurrency = file.concurrency.unwrap_or(1);
        if concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        Ok(Self {
            project_id: project_id.to_string(),
            dataset_id: dataset_id.to_string(),
            bucket: non_empty(env(BUCKET_ENV))
                .or(non_empty(file.bucket))
                .unwrap_or_else(|| project_id.to_string()),
            access_token: non_empty(env(ACCESS_TOKEN_ENV)).or(non_empty(file.access_token)),
            bigquery_api: file
                .bigquery_api
                .unwrap_or_else(|| DEFAULT_BIGQUERY_API_URL.to_string()),
            storage_api: file
                .storage_api
                .unwrap_or_else(|| DEFAULT_STORAGE_API_URL.to_string()),
            concurrency,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::resolve("project", "dataset", FileConfig::default(), no_env)
            .unwrap();
        assert_eq!(config.bucket, "project");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.bigquery_api, DEFAULT_BIGQUERY_API_URL);
        assert_eq!(config.storage_api, DEFAULT_STORAGE_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = FileConfig {
            bucket: Some("file-bucket".into()),
            access_token: Some("file-token".into()),
            ..Default::default()
        };
        let env: HashMap<&str, &str> =
            HashMap::from([(BUCKET_ENV, "env-bucket"), (ACCESS_TOKEN_ENV, "env-token")]);

        let config = MirrorConfig::resolve("project", "dataset", file, |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.bucket, "env-bucket");
        assert_eq!(config.access_token.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_blank_environment_is_ignored() {
        let file = FileConfig {
            bucket: Some("file-bucket".into()),
            ..Default::default()
        };
        let config =
            MirrorConfig::resolve("project", "dataset", file, |_| Some("  ".to_string())).unwrap();
        assert_eq!(config.bucket, "file-bucket");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(MirrorConfig::resolve("", "dataset", FileConfig::default(), no_env).is_err());
        assert!(MirrorConfig::resolve("p", "a/b", FileConfig::default(), no_env).is_err());
        let file = FileConfig {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(MirrorConfig::resolve("p", "d", file, no_env).is_err());
    }

    #[test]
    fn test_load_file_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "bucket = \"backups\"\nconcurrency = 4\nstorage_api = \"http://localhost:4443\"\n",
        )
        .unwrap();

        let file = load_file_config(&path).unwrap();
        assert_eq!(file.bucket.as_deref(), Some("backups"));
        assert_eq!(file.concurrency, Some(4));
        assert_eq!(file.storage_api.as_deref(), Some("http://localhost:4443"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "buckett = \"typo\"\n").unwrap();
        assert!(load_file_config(&path).is_err());
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(MirrorConfig::load("project", "dataset", Some(&missing)).is_err());
    }
}
