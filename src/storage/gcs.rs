// ABOUTME: Cloud Storage JSON API client implementing the BlobStore capability
// ABOUTME: Lists folder prefixes with a delimiter and moves small text objects

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::BlobStore;
use crate::error::MirrorError;
use crate::http::{authorize, build_client, check_status, endpoint, parse_base_url};

/// Default Cloud Storage API base URL
pub const DEFAULT_STORAGE_API_URL: &str = "https://storage.googleapis.com";

const SERVICE: &str = "Cloud Storage";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    /// Omitted when nothing under the prefix contains the delimiter.
    #[serde(default)]
    prefixes: Vec<String>,
    next_page_token: Option<String>,
}

/// Last path segment of a folder prefix such as `dataset/table1/`.
pub fn folder_name(prefix: &str) -> Result<String, MirrorError> {
    prefix
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| MirrorError::malformed(SERVICE, format!("unusable folder prefix '{}'", prefix)))
}

/// Cloud Storage client bound to one bucket
pub struct CloudStorageClient {
    client: Client,
    api_base_url: Url,
    bucket: String,
    access_token: Option<String>,
}

impl CloudStorageClient {
    pub fn new(
        api_base_url: Option<&str>,
        bucket: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_base_url: parse_base_url(api_base_url.unwrap_or(DEFAULT_STORAGE_API_URL), SERVICE)?,
            bucket: bucket.into(),
            access_token,
        })
    }

    fn objects_url(&self) -> Url {
        endpoint(&self.api_base_url, &["storage", "v1", "b", &self.bucket, "o"])
    }

    fn object_url(&self, name: &str) -> Url {
        endpoint(&self.api_base_url, &["storage", "v1", "b", &self.bucket, "o", name])
    }

    fn upload_url(&self, name: &str) -> Url {
        let mut url = endpoint(&self.api_base_url, &["upload", "storage", "v1", "b", &self.bucket, "o"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", name);
        url
    }

    async fn list_page(&self, prefix: &str, page_token: Option<&str>) -> Result<ObjectList> {
        let mut url = self.objects_url();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("prefix", prefix).append_pair("delimiter", "/");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        tracing::debug!("Listing folders: {}", url);

        let response = authorize(self.client.get(url), self.access_token.as_deref())
            .send()
            .await
            .with_context(|| format!("Failed to list gs://{}/{}", self.bucket, prefix))?;
        let response = check_status(response, SERVICE, prefix).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse object listing for gs://{}/{}", self.bucket, prefix))
    }
}

#[async_trait]
impl BlobStore for CloudStorageClient {
    async fn list_subfolders(&self, prefix: &str) -> Result<Vec<String>> {
        let mut prefix = prefix.to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        let mut folders = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(&prefix, page_token.as_deref()).await?;
            for folder in &page.prefixes {
                folders.push(folder_name(folder)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(folders)
    }

    async fn write_object(&self, path: &str, content: &str) -> Result<()> {
        let url = self.upload_url(path);
        tracing::debug!("Uploading gs://{}/{}", self.bucket, path);

        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(content.to_string());

        let response = authorize(request, self.access_token.as_deref())
            .send()
            .await
            .with_context(|| format!("Failed to upload gs://{}/{}", self.bucket, path))?;
        check_status(response, SERVICE, path).await?;

        Ok(())
    }

    async fn read_object(&self, path: &str) -> Result<String> {
        let mut url = self.object_url(path);
        url.query_pairs_mut().append_pair("alt", "media");

        let response = authorize(self.client.get(url), self.access_token.as_deref())
            .send()
            .await
            .with_context(|| format!("Failed to download gs://{}/{}", self.bucket, path))?;
        let response = check_status(response, SERVICE, path).await?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of gs://{}/{}", self.bucket, path))
    }
}
