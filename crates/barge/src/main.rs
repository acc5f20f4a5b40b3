//! barge: stream dataset releases into S3 and query them with Athena.

mod config;
mod progress;
mod queries;

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

use barge_query::{AthenaService, QueryRunner, ResultTable};
use barge_transfer::{
    BucketDescriptor, BucketProvisioner, CatalogClient, PipelineOptions, ReqwestSource, S3Gateway,
    TransferOutcome, TransferPipeline,
};

use config::Config;
use progress::ConsoleProgress;

#[derive(Parser)]
#[command(name = "barge", about = "Stream dataset releases into S3 and query them with Athena")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch release metadata and stream every file into the destination bucket
    Ingest {
        /// Dataset names to ingest, in order
        #[arg(default_values_t = [String::from("papers"), String::from("abstracts")])]
        datasets: Vec<String>,
        /// Maximum number of files transferred at once
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Run a query against the ingested data
    Query {
        #[command(subcommand)]
        shape: QueryShape,
    },
}

#[derive(Subcommand)]
enum QueryShape {
    /// Papers in a field of study
    FieldOfStudy { field: String },
    /// Papers by author name (partial match)
    Author { name: String },
    /// Papers published in a journal
    Journal { name: String },
    /// Ad-hoc SQL
    Custom { sql: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Ingest {
            datasets,
            concurrency,
        } => ingest(&config, &datasets, concurrency).await,
        Command::Query { shape } => query(&config, shape).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn sdk_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}

async fn ingest(config: &Config, datasets: &[String], concurrency: usize) -> Result<()> {
    let sdk = sdk_config(&config.region).await;
    let store = S3Gateway::new(aws_sdk_s3::Client::new(&sdk));

    // The bucket must exist before any worker starts uploading.
    BucketProvisioner::new(store.clone())
        .ensure(&BucketDescriptor {
            name: config.bucket.clone(),
            region: config.region.clone(),
        })
        .await?;

    let http = reqwest::Client::new();
    let catalog = CatalogClient::with_client(http.clone(), config.api_key.clone());
    let mut failed_datasets = 0usize;

    for dataset in datasets {
        // A failed metadata fetch is fatal to this dataset only.
        let release = match catalog.fetch_release(dataset, &config.release_url(dataset)).await {
            Ok(release) => release,
            Err(err) => {
                error!(dataset = %dataset, error = %err, "metadata fetch failed, skipping dataset");
                failed_datasets += 1;
                continue;
            }
        };

        if release.is_empty() {
            println!("No files found for {dataset}");
            continue;
        }
        println!(
            "Retrieved {} files from {dataset} dataset",
            release.file_urls.len()
        );

        let pipeline = TransferPipeline::new(
            ReqwestSource::new(http.clone()),
            store.clone(),
            config.bucket.clone(),
        )
        .with_options(PipelineOptions { concurrency })
        .with_observer(Arc::new(ConsoleProgress::new()));

        let outcomes = pipeline.run(&release).await;
        let mut succeeded = 0usize;
        for (task, outcome) in &outcomes {
            match outcome {
                TransferOutcome::Success => succeeded += 1,
                TransferOutcome::Failure(err) => {
                    println!(
                        "Failed s3://{}/{}: {err}",
                        config.bucket, task.destination_key
                    );
                }
            }
        }
        println!(
            "{dataset}: {succeeded}/{} files transferred to s3://{}",
            outcomes.len(),
            config.bucket
        );
    }

    if failed_datasets > 0 {
        bail!("{failed_datasets} dataset(s) could not be fetched from the catalog");
    }
    Ok(())
}

async fn query(config: &Config, shape: QueryShape) -> Result<()> {
    let (sql, renames) = build_query(config, &shape)?;

    let sdk = sdk_config(&config.region).await;
    let service = AthenaService::new(aws_sdk_athena::Client::new(&sdk));
    let runner = QueryRunner::new(service, config.database.clone(), config.output_location.clone());

    // Ctrl-C abandons the wait; the Athena job itself keeps running.
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let mut table: ResultTable = runner.run(&sql, &cancel).await?;
    if let Some(renames) = renames {
        table.rename_columns(renames);
    }

    if table.is_empty() {
        println!("No results found.");
    } else {
        println!("{table}");
    }
    Ok(())
}

fn build_query(
    config: &Config,
    shape: &QueryShape,
) -> Result<(String, Option<&'static [&'static str]>)> {
    let (database, table) = (config.database.as_str(), config.table.as_str());
    Ok(match shape {
        QueryShape::FieldOfStudy { field } => (
            queries::papers_by_field_of_study(database, table, field),
            Some(&queries::CANNED_COLUMNS[..]),
        ),
        QueryShape::Author { name } => (
            queries::papers_by_author(database, table, name),
            Some(&queries::CANNED_COLUMNS[..]),
        ),
        QueryShape::Journal { name } => (
            queries::papers_by_journal(database, table, name),
            Some(&queries::CANNED_COLUMNS[..]),
        ),
        QueryShape::Custom { sql } => {
            if sql.trim().is_empty() {
                bail!("SQL query cannot be empty");
            }
            (sql.clone(), None)
        }
    })
}
