use delays_common::logging::{init_logging, LogConfig, LogFormat};

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // CloudWatch ingests one JSON object per line; LOG_* variables still win
    let log_config = LogConfig::builder()
        .format(LogFormat::Json)
        .include_targets(false)
        .filter_directives("delays_etl=debug,sqlx=warn,aws_config=warn,aws_smithy_runtime=warn")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting delays ETL");

    delays_etl::lambda::run().await
}
