mod harvest;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trailscrape_core::RegionSlug;
use trailscrape_scraper::ScraperError;

#[derive(Debug, Parser)]
#[command(name = "trailscrape")]
#[command(about = "Harvest Trailforks region trail listings and ride logs as CSV")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check that a region exists
    Validate {
        /// Region slug as it appears in the Trailforks URL
        region: RegionSlug,
    },
    /// Show a region's ride-log statistics
    Info {
        region: RegionSlug,
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download the region's trail spreadsheet export (requires login)
    Trails {
        region: RegionSlug,
        /// Numeric Trailforks region id used by the export endpoint
        #[arg(long)]
        region_id: u64,
        /// Output directory (defaults to TRAILSCRAPE_OUTPUT_DIR or ".")
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Crawl every ride-log page of the region into one CSV (requires login)
    Ridelogs {
        region: RegionSlug,
        /// Output directory (defaults to TRAILSCRAPE_OUTPUT_DIR or ".")
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Drop tables with this column when a page holds several tables
        #[arg(long, default_value = "city")]
        exclude_column: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = trailscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate { region } => harvest::run_validate(&config, &region).await,
        Commands::Info { region, json } => harvest::run_info(&config, &region, json).await,
        Commands::Trails {
            region,
            region_id,
            output,
        } => {
            let output = output.unwrap_or_else(|| config.output_dir.clone());
            harvest::run_trails(&config, &region, region_id, &output).await
        }
        Commands::Ridelogs {
            region,
            output,
            exclude_column,
        } => {
            let output = output.unwrap_or_else(|| config.output_dir.clone());
            harvest::run_ridelogs(&config, &region, &output, exclude_column).await
        }
    };

    if let Err(err) = &result {
        if let Some(ScraperError::InvalidRegion { region }) = err.downcast_ref::<ScraperError>() {
            harvest::exit_invalid_region(region);
        }
    }
    result
}
