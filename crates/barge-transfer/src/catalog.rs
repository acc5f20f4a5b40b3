//! Release metadata retrieval from the catalog API.

use serde::Deserialize;
use tracing::debug;

use crate::data::DatasetRelease;
use crate::error::FetchError;

#[derive(Debug, Deserialize)]
struct ReleaseMetadata {
    // An absent `files` field is the zero-task case, not a malformed payload.
    #[serde(default)]
    files: Vec<String>,
}

/// Authenticated client for the catalog's release metadata endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    api_key: String,
}

impl CatalogClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_key)
    }

    pub fn with_client(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    /// Fetch the file list for `dataset` from `metadata_url`.
    ///
    /// An empty file list is a valid release with zero files; the pipeline
    /// turns it into zero tasks and zero outcomes.
    pub async fn fetch_release(
        &self,
        dataset: &str,
        metadata_url: &str,
    ) -> Result<DatasetRelease, FetchError> {
        let response = self
            .http
            .get(metadata_url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                dataset: dataset.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                dataset: dataset.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            dataset: dataset.to_string(),
            source,
        })?;
        parse_release(dataset, &body)
    }
}

fn parse_release(dataset: &str, body: &str) -> Result<DatasetRelease, FetchError> {
    let metadata: ReleaseMetadata =
        serde_json::from_str(body).map_err(|source| FetchError::Payload {
            dataset: dataset.to_string(),
            source,
        })?;
    debug!(dataset, files = metadata.files.len(), "fetched release metadata");
    Ok(DatasetRelease::new(dataset, metadata.files))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_list_in_order() {
        let release = parse_release(
            "papers",
            r#"{"files": ["https://a.example/1", "https://a.example/2"]}"#,
        )
        .unwrap();
        assert_eq!(release.name, "papers");
        assert_eq!(
            release.file_urls,
            vec!["https://a.example/1", "https://a.example/2"]
        );
    }

    #[test]
    fn absent_files_field_is_zero_task_release() {
        let release = parse_release("papers", r#"{"release_id": "2024-01-01"}"#).unwrap();
        assert!(release.is_empty());
    }

    #[test]
    fn malformed_payload_is_fetch_error() {
        let err = parse_release("papers", "not json").unwrap_err();
        assert!(matches!(err, FetchError::Payload { ref dataset, .. } if dataset == "papers"));
    }
}
