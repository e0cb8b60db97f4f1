use thiserror::Error;
use vacancy_feed::cli::{Cli, Commands};
use vacancy_feed::logging::init_logging;
use vacancy_feed::pipeline::{Pipeline, PipelineError};

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let cli = Cli::parse_args();
    let config = cli.command.harvest_config();

    match cli.command {
        Commands::Run { log_dir, .. } => {
            let _guards = init_logging(&log_dir).map_err(|e| MainError::Logging(e.to_string()))?;

            tracing::info!(
                workers = config.workers,
                batch_size = config.batch_size,
                attempts = config.attempts,
                timeout_secs = config.timeout_secs,
                "starting vacancy harvest"
            );

            let pipeline = Pipeline::new(config)?;
            let report = pipeline.run().await?;
            println!("{}", report);
        }
    }

    Ok(())
}
