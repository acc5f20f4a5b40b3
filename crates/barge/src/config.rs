//! Environment-driven configuration, resolved once per invocation.

use std::env;

use anyhow::{Context, Result};

const DEFAULT_CATALOG_BASE: &str = "https://api.semanticscholar.org/datasets/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub bucket: String,
    pub api_key: String,
    pub database: String,
    pub table: String,
    pub output_location: String,
    pub catalog_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            region: require("AWS_REGION")?,
            bucket: require("S3_BUCKET_NAME")?,
            api_key: require("SEMANTIC_SCHOLAR_API_KEY")?,
            database: require("ATHENA_DATABASE")?,
            table: env::var("ATHENA_TABLE").unwrap_or_else(|_| "papers".to_string()),
            output_location: require("ATHENA_OUTPUT_LOCATION")?,
            catalog_base: env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CATALOG_BASE.to_string()),
        })
    }

    /// Metadata URL for the latest release of `dataset`.
    pub fn release_url(&self, dataset: &str) -> String {
        format!(
            "{}/release/latest/dataset/{dataset}",
            self.catalog_base.trim_end_matches('/')
        )
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("environment variable {name} is not set"))
}
