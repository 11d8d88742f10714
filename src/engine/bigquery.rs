// ABOUTME: BigQuery v2 REST client implementing the QueryEngine capability
// ABOUTME: Handles table listing pagination, COUNT(*) queries, and extract job submission

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::models::{ExtractJob, QueryRequest, QueryResponse, TableList};
use super::QueryEngine;
use crate::http::{authorize, build_client, check_status, endpoint, parse_base_url};

/// Default BigQuery REST API base URL
pub const DEFAULT_BIGQUERY_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

const SERVICE: &str = "BigQuery";

/// BigQuery client scoped to a single project and dataset
pub struct BigQueryClient {
    client: Client,
    api_base_url: Url,
    project_id: String,
    dataset_id: String,
    access_token: Option<String>,
}

impl BigQueryClient {
    /// Create a new BigQuery client
    ///
    /// # Arguments
    ///
    /// * `api_base_url` - Optional base URL (defaults to the public v2 endpoint)
    /// * `project_id` - Project that owns the dataset and runs the jobs
    /// * `dataset_id` - Dataset whose tables are mirrored
    /// * `access_token` - OAuth2 bearer token
    pub fn new(
        api_base_url: Option<&str>,
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_base_url: parse_base_url(
                api_base_url.unwrap_or(DEFAULT_BIGQUERY_API_URL),
                SERVICE,
            )?,
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            access_token,
        })
    }

    fn project_url(&self, rest: &[&str]) -> Url {
        let mut segments = vec!["projects", self.project_id.as_str()];
        segments.extend_from_slice(rest);
        endpoint(&self.api_base_url, &segments)
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<TableList> {
        let mut url = self.project_url(&["datasets", &self.dataset_id, "tables"]);
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        tracing::debug!("Listing tables: {}", url);

        let response = authorize(self.client.get(url.clone()), self.access_token.as_deref())
            .send()
            .await
            .context("Failed to send table listing request to BigQuery")?;
        let response = check_status(response, SERVICE, url.as_str()).await?;

        response
            .json()
            .await
            .context("Failed to parse table listing from BigQuery")
    }
}

#[async_trait]
impl QueryEngine for BigQueryClient {
    async fn list_datasets(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(page_token.as_deref()).await?;
            for entry in &page.tables {
                tables.push(entry.table_name()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(tables)
    }

    async fn count_rows(&self, table: &str) -> Result<String> {
        let url = self.project_url(&["queries"]);
        let body = QueryRequest::count_rows(&self.dataset_id, table);
        tracing::debug!("Running row count query for {}: {}", table, body.query);

        let response = authorize(self.client.post(url.clone()).json(&body), self.access_token.as_deref())
            .send()
            .await
            .with_context(|| format!("Failed to send row count query for '{}'", table))?;
        let response = check_status(response, SERVICE, url.as_str()).await?;

        let result: QueryResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse row count response for '{}'", table))?;

        Ok(result.single_value()?)
    }

    async fn submit_export(
        &self,
        table: &str,
        destination_uri: &str,
        job_id: &str,
    ) -> Result<()> {
        let url = self.project_url(&["jobs"]);
        let job = ExtractJob::gzip_json(
            &self.project_id,
            &self.dataset_id,
            table,
            destination_uri,
            job_id,
        );
        tracing::debug!("Submitting extract job {} for {}", job_id, table);

        let response = authorize(self.client.post(url.clone()).json(&job), self.access_token.as_deref())
            .send()
            .await
            .with_context(|| format!("Failed to submit export job for '{}'", table))?;
        check_status(response, SERVICE, url.as_str()).await?;

        Ok(())
    }
}
