//! Delays producer - publishes an exported delay batch onto the stream

use anyhow::{Context, Result};
use clap::Parser;
use delays_common::logging::{init_logging, LogConfig, LogLevel};
use delays_producer::publisher::DEFAULT_STREAM_NAME;
use delays_producer::{produce, source, KinesisPublisher};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "delays-producer")]
#[command(author, version, about = "Publish delay records onto a Kinesis stream")]
struct Cli {
    /// JSON file holding an array of raw delay records
    #[arg(short, long)]
    file: String,

    /// Target stream name
    #[arg(short, long, env = "STREAM_NAME", default_value = DEFAULT_STREAM_NAME)]
    stream: String,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// Endpoint override (e.g. LocalStack)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("delays-producer")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let records = source::load_records(&cli.file)
        .with_context(|| format!("Failed to load records from {}", cli.file))?;

    let publisher =
        KinesisPublisher::connect(&cli.stream, &cli.region, cli.endpoint_url.as_deref()).await;
    let report = produce(&records, &publisher).await;

    info!("Publishing complete");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
