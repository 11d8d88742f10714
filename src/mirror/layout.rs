// ABOUTME: Deterministic object paths for mirrored datasets
// ABOUTME: Every table lives under <namespace>/<table>/ with a marker and a data object

/// Object holding the row count recorded at the last export.
pub const MARKER_OBJECT: &str = "num_rows.txt";
/// Gzip-compressed newline-delimited JSON snapshot of the table.
pub const DATA_OBJECT: &str = "data.json.gz";

/// Maps table names to their mirror location inside a bucket.
///
/// The namespace is the source dataset id, so a table `events` in dataset
/// `analytics` is mirrored under `analytics/events/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorLayout {
    bucket: String,
    namespace: String,
}

impl MirrorLayout {
    pub fn new(bucket: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            namespace: namespace.into().trim_matches('/').to_string(),
        }
    }

    /// Prefix whose subfolders are the mirrored tables.
    pub fn namespace_prefix(&self) -> String {
        format!("{}/", self.namespace)
    }

    pub fn location(&self, table: &str) -> String {
        format!("{}/{}/", self.namespace, table)
    }

    pub fn marker_path(&self, table: &str) -> String {
        format!("{}{}", self.location(table), MARKER_OBJECT)
    }

    pub fn data_path(&self, table: &str) -> String {
        format!("{}{}", self.location(table), DATA_OBJECT)
    }

    /// Fully qualified destination handed to the export job.
    pub fn data_uri(&self, table: &str) -> String {
        format!("gs://{}/{}", self.bucket, self.data_path(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = MirrorLayout::new("project", "dataset");
        assert_eq!(layout.namespace_prefix(), "dataset/");
        assert_eq!(layout.marker_path("table1"), "dataset/table1/num_rows.txt");
        assert_eq!(layout.data_path("table1"), "dataset/table1/data.json.gz");
        assert_eq!(
            layout.data_uri("table1"),
            "gs://project/dataset/table1/data.json.gz"
        );
    }

    #[test]
    fn test_namespace_slashes_are_trimmed() {
        let layout = MirrorLayout::new("bucket", "/dataset/");
        assert_eq!(layout.namespace_prefix(), "dataset/");
        assert_eq!(layout.location("t"), "dataset/t/");
    }
}
