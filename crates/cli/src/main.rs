use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticket_checker_core::{
    load_config, load_task_list, validate_config, HttpQueryClient, QueryClient, ReportWriter,
    SanitizedConfig, TaskRunner, CONFIG_PATH_ENV,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("checker.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!(config = %sanitized, "Configuration loaded successfully");

    let date = config.target_date();

    // Load the task list
    let tasks = load_task_list(&config.input.path, &date)
        .with_context(|| format!("Failed to load task list from {:?}", config.input.path))?;

    // Build the query client and the worker pool
    let client: Arc<dyn QueryClient> = Arc::new(
        HttpQueryClient::new(config.query.clone()).context("Failed to create query client")?,
    );
    let runner =
        TaskRunner::new(config.runner.clone(), client).context("Failed to create task runner")?;

    info!(date = %date, tasks = tasks.len(), "Checking tickets");
    let report = runner.run_all(tasks).await;

    // Write reports
    let writer = ReportWriter::new(config.output.clone());
    let paths = writer
        .write(&report, &date)
        .await
        .context("Failed to write reports")?;

    info!(
        succeeded = report.success_count(),
        failed = report.failure_count(),
        table = %paths.table.display(),
        failures = %paths.failures.display(),
        "Done"
    );

    Ok(())
}
