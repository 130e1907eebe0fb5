use gcal_units::error::Error;
use gcal_units::startup;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let workflow_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| Error::Config("Usage: gcal-units <workflow.json>".to_string()))?;

    info!("Starting workflow {}", workflow_path.display());

    // Load configuration
    let config = startup::load_config()?;
    let operations = startup::load_workflow(&workflow_path).await?;

    startup::run_workflow(&config, &operations, |operation, output| {
        let rendered = serde_json::to_string_pretty(output)?;
        println!("{}: {}", operation.name(), rendered);
        Ok(())
    })
    .await?;

    info!("Workflow finished ({} steps)", operations.len());
    Ok(())
}
