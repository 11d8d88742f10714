// ABOUTME: Wire types for the BigQuery v2 REST API
// ABOUTME: Table listings, synchronous count queries, and extract job submissions

use serde::{Deserialize, Serialize};

use crate::error::MirrorError;

const SERVICE: &str = "BigQuery";

/// One page of `tables.list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableList {
    /// Omitted by the API when the dataset (or page) has no tables.
    #[serde(default)]
    pub tables: Vec<TableEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableEntry {
    /// Formatted as `project:dataset.table`.
    pub id: String,
}

impl TableEntry {
    /// Extract the table name from the fully qualified id.
    ///
    /// Periods are not valid in project, dataset, or table names, so the
    /// segment after the first period is the table.
    pub fn table_name(&self) -> Result<String, MirrorError> {
        match self.id.split('.').nth(1) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(MirrorError::malformed(
                SERVICE,
                format!("table id '{}' is not of the form project:dataset.table", self.id),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn count_rows(dataset_id: &str, table: &str) -> Self {
        Self {
            query: format!("SELECT COUNT(*) FROM {}.{}", dataset_id, table),
        }
    }
}

/// Response of `jobs.query`; the count lives at `rows[0].f[0].v`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub rows: Vec<QueryRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRow {
    #[serde(default)]
    pub f: Vec<QueryCell>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryCell {
    pub v: Option<String>,
}

impl QueryResponse {
    pub fn single_value(&self) -> Result<String, MirrorError> {
        self.rows
            .first()
            .and_then(|row| row.f.first())
            .and_then(|cell| cell.v.clone())
            .ok_or_else(|| MirrorError::malformed(SERVICE, "count query returned no value"))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractJob {
    pub job_reference: JobReference,
    pub configuration: JobConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobConfiguration {
    pub extract: ExtractConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractConfiguration {
    pub source_table: TableReference,
    pub destination_uris: Vec<String>,
    pub destination_format: String,
    pub compression: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl ExtractJob {
    /// Full-table export as gzip-compressed newline-delimited JSON.
    pub fn gzip_json(
        project_id: &str,
        dataset_id: &str,
        table: &str,
        destination_uri: &str,
        job_id: &str,
    ) -> Self {
        Self {
            job_reference: JobReference {
                project_id: project_id.to_string(),
                job_id: job_id.to_string(),
            },
            configuration: JobConfiguration {
                extract: ExtractConfiguration {
                    source_table: TableReference {
                        project_id: project_id.to_string(),
                        dataset_id: dataset_id.to_string(),
                        table_id: table.to_string(),
                    },
                    destination_uris: vec![destination_uri.to_string()],
                    destination_format: "NEWLINE_DELIMITED_JSON".to_string(),
                    compression: "GZIP".to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_from_listing() {
        let list: TableList = serde_json::from_value(serde_json::json!({
            "tables": [
                {"id": "project:dataset.tablename"},
                {"id": "thing:thing.thing"}
            ]
        }))
        .unwrap();

        let names: Vec<String> = list
            .tables
            .iter()
            .map(|t| t.table_name().unwrap())
            .collect();
        assert_eq!(names, vec!["tablename", "thing"]);
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn test_empty_listing_has_no_tables_key() {
        let list: TableList = serde_json::from_value(serde_json::json!({
            "kind": "bigquery#tableList",
            "totalItems": 0
        }))
        .unwrap();
        assert!(list.tables.is_empty());
    }

    #[test]
    fn test_table_id_without_period_is_malformed() {
        let entry = TableEntry {
            id: "project:dataset".to_string(),
        };
        assert!(matches!(
            entry.table_name(),
            Err(MirrorError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_count_query_text() {
        let request = QueryRequest::count_rows("dataset", "table1");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"query": "SELECT COUNT(*) FROM dataset.table1"})
        );
    }

    #[test]
    fn test_count_extraction() {
        let response: QueryResponse = serde_json::from_value(serde_json::json!({
            "rows": [{"f": [{"v": "164"}]}]
        }))
        .unwrap();
        assert_eq!(response.single_value().unwrap(), "164");

        let empty: QueryResponse =
            serde_json::from_value(serde_json::json!({"jobComplete": false})).unwrap();
        assert!(empty.single_value().is_err());
    }

    #[test]
    fn test_extract_job_serialization() {
        let job = ExtractJob::gzip_json(
            "project",
            "dataset",
            "table1",
            "gs://project/dataset/table1/data.json.gz",
            "123",
        );

        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            serde_json::json!({
                "jobReference": {
                    "projectId": "project",
                    "jobId": "123"
                },
                "configuration": {
                    "extract": {
                        "sourceTable": {
                            "projectId": "project",
                            "datasetId": "dataset",
                            "tableId": "table1"
                        },
                        "destinationUris": ["gs://project/dataset/table1/data.json.gz"],
                        "destinationFormat": "NEWLINE_DELIMITED_JSON",
                        "compression": "GZIP"
                    }
                }
            })
        );
    }
}
