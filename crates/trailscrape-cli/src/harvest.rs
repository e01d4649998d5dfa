//! Command handlers for the CLI.
//!
//! A region that fails validation ends the process with status 1 before
//! any export or crawl work starts. The download operations validate on
//! their own and surface `InvalidRegion`, which `main` turns into the same
//! exit; every other failure is returned to `main` as an error.

use std::path::Path;

use trailscrape_core::{AppConfig, Credentials, RegionSlug};
use trailscrape_scraper::{
    AuthenticatedClient, ClientSettings, CrawlTermination, ExcludeColumn, TrailforksClient,
};

use crate::progress;

/// Prints the invalid-region diagnostic and exits with status 1.
pub(crate) fn exit_invalid_region(region: &str) -> ! {
    tracing::warn!(region, "region failed validation; stopping");
    eprintln!("{}", invalid_region_message(region));
    std::process::exit(1)
}

pub(crate) fn invalid_region_message(region: &str) -> String {
    format!("[!] {region} is not a valid Trailforks Region.")
}

fn build_client(config: &AppConfig) -> anyhow::Result<TrailforksClient> {
    TrailforksClient::new(&ClientSettings::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build Trailforks client: {e}"))
}

fn require_credentials(config: &AppConfig) -> anyhow::Result<&Credentials> {
    config.credentials.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "TRAILFORKS_USERNAME and TRAILFORKS_PASSWORD must be set for this command"
        )
    })
}

async fn login(config: &AppConfig) -> anyhow::Result<AuthenticatedClient> {
    let credentials = require_credentials(config)?;
    let client = build_client(config)?;
    tracing::info!(username = %credentials.username, "logging in");
    Ok(client.login(credentials).await?)
}

/// Stops the process when `region` does not exist; returns otherwise.
///
/// # Errors
///
/// Returns an error if the validity probe itself fails (network, 5xx).
pub(crate) async fn check_region(
    client: &TrailforksClient,
    region: &RegionSlug,
) -> anyhow::Result<()> {
    if !client.is_valid_region(region).await? {
        exit_invalid_region(region.as_str());
    }
    Ok(())
}

pub(crate) async fn run_validate(config: &AppConfig, region: &RegionSlug) -> anyhow::Result<()> {
    let client = build_client(config)?;
    check_region(&client, region).await?;
    tracing::info!(%region, "region is valid");
    println!("{region} is a valid Trailforks Region.");
    Ok(())
}

pub(crate) async fn run_info(
    config: &AppConfig,
    region: &RegionSlug,
    json: bool,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    check_region(&client, region).await?;
    let info = client.get_region_info(region).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("region:                  {region}");
        println!("total ride logs:         {}", info.total_ridelogs);
        println!("unique riders:           {}", info.unique_riders);
        println!("trails ridden:           {}", info.trails_ridden);
        println!("average trails per ride: {}", info.average_trails_per_ride);
    }
    Ok(())
}

/// Logs in, downloads the trail export for `region` and writes it under `output`.
///
/// # Errors
///
/// Returns an error if credentials are missing, login fails, or the export
/// cannot be downloaded or written.
pub(crate) async fn run_trails(
    config: &AppConfig,
    region: &RegionSlug,
    region_id: u64,
    output: &Path,
) -> anyhow::Result<()> {
    let client = login(config).await?;

    let summary = client
        .download_all_region_trails(region, region_id, output)
        .await?;

    if !summary.check.is_consistent() {
        tracing::warn!(
            %region,
            mismatched = summary.check.mismatched_records,
            records = summary.check.records,
            "export still has records with an unexpected field count"
        );
    }
    println!(
        "wrote {} ({} records)",
        summary.path.display(),
        summary.check.records
    );
    Ok(())
}

/// Logs in, crawls every ride-log page of `region` and writes the table under `output`.
///
/// A crawl that stops early still writes what it collected; the halt is
/// reported as a warning.
///
/// # Errors
///
/// Returns an error if credentials are missing, login fails, the statistics
/// page cannot be read, no table was collected, or the output cannot be written.
pub(crate) async fn run_ridelogs(
    config: &AppConfig,
    region: &RegionSlug,
    output: &Path,
    exclude_column: String,
) -> anyhow::Result<()> {
    let client = login(config).await?;

    let bar = progress::page_bar(&format!("Enumerating {region} Rider Pages"));
    let classifier = ExcludeColumn(exclude_column);
    let result = client
        .download_all_region_ridelogs(
            region,
            output,
            &classifier,
            &mut |pages| bar.set_length(pages),
            &mut |_| bar.inc(1),
        )
        .await;
    bar.finish_and_clear();
    let (report, path) = result?;

    if let CrawlTermination::HaltedOnError { page, cause } = &report.termination {
        tracing::warn!(
            %region,
            page,
            total_pages = report.total_pages,
            error = %cause,
            "crawl stopped early; writing the pages collected so far"
        );
    }
    println!(
        "wrote {} ({} rows from {} of {} pages)",
        path.display(),
        report.table.len(),
        report.pages_fetched,
        report.total_pages
    );
    Ok(())
}
