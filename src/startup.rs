use crate::components::google_calendar::{Operation, Output};
use crate::components::Context;
use crate::config::Config;
use crate::error::{CalendarResult, Error};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the run configuration
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Read a workflow: a JSON array of operations
pub async fn load_workflow(path: &Path) -> CalendarResult<Vec<Operation>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Authenticate from `config`, then run each operation in order.
///
/// `on_output` sees every result as it is produced; the first failure ends the run.
pub async fn run_workflow<F>(
    config: &Config,
    operations: &[Operation],
    mut on_output: F,
) -> CalendarResult<Context>
where
    F: FnMut(&Operation, &Output) -> CalendarResult<()>,
{
    let mut ctx = Context::new();
    Operation::Authenticate(config.auth_request())
        .execute(&mut ctx)
        .await?;

    for (index, operation) in operations.iter().enumerate() {
        let mut operation = operation.clone();
        operation.default_calendar(&config.calendar_id);

        info!("Step {}: {}", index + 1, operation.name());
        match operation.execute(&mut ctx).await {
            Ok(output) => on_output(&operation, &output)?,
            Err(e) => {
                error!("Step {} ({}) failed: {}", index + 1, operation.name(), e);
                return Err(e);
            }
        }
    }

    Ok(ctx)
}
