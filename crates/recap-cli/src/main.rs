//! Main entry point for the recap command.

use anyhow::Context;
use clap::Parser;
use recap_cli::{run, Args};
use recap_common::init_logging;
use recap_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, source) = ConfigLoader::load_with_source(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }

    // Held until exit so buffered file logs are flushed.
    let _guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    match &source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults and environment"),
    }

    match run(&args, &config).await {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            error!("Recap failed: {e}");
            Err(e).context("Failed to build recap")
        }
    }
}
