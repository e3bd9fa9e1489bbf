mod pipeline;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::pipeline::{Pipeline, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "reelpost")]
#[command(about = "Republish a trending video as an Instagram reel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Locate, stage, publish, and clean up (default)
    Run {
        /// Search query; defaults to `REELPOST_QUERY`
        #[arg(long)]
        query: Option<String>,
        /// Object name for the staged video; defaults to `REELPOST_FILE_NAME`
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Only search and print the candidate as JSON
    Locate {
        #[arg(long)]
        query: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = reelpost_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "loaded configuration");

    let pipeline = Pipeline::from_config(&config)?;

    match cli.command {
        Some(Commands::Locate { query }) => {
            let query = query.unwrap_or_else(|| config.query.clone());
            match pipeline.locate(&query).await {
                Some(candidate) => println!("{}", serde_json::to_string_pretty(&candidate)?),
                None => println!("no trending video found for \"{query}\""),
            }
        }
        Some(Commands::Run { query, file_name }) => {
            let query = query.unwrap_or_else(|| config.query.clone());
            let file_name = file_name.unwrap_or_else(|| config.file_name.clone());
            report(pipeline.run(&query, &file_name).await?);
        }
        None => report(pipeline.run(&config.query, &config.file_name).await?),
    }

    Ok(())
}

fn report(outcome: RunOutcome) {
    match outcome {
        RunOutcome::NoCandidate => tracing::info!("nothing to publish"),
        RunOutcome::NoContainer => tracing::warn!("media container was not created"),
        RunOutcome::Published {
            container_id,
            receipt,
        } => tracing::info!(
            container_id = container_id.as_str(),
            media_id = receipt.media_id.as_deref().unwrap_or("-"),
            "run complete"
        ),
    }
}
