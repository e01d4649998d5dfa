//! Ride-log statistics scraped from a region's `ridelogstats` page.
//!
//! The statistics block is a `div.col-2.center` holding an unlabeled list of
//! four items. Values are assigned by position: total ride logs, unique
//! riders, trails ridden, average trails per ride. A reordering on the site
//! would silently swap fields, so the item count is checked exactly.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use trailscrape_core::{RegionInfo, RegionSlug};

use crate::client::TrailforksClient;
use crate::error::ScraperError;

const STATS_CONTAINER: &str = "div.col-2.center";
const STATS_ITEM: &str = "li";
const STATS_ITEM_COUNT: usize = 4;

static CONTAINER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(STATS_CONTAINER).expect("valid container selector"));
static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(STATS_ITEM).expect("valid item selector"));

// First number that directly follows a tag boundary, e.g. `<strong>12,345</strong>`.
static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s*([0-9][0-9,.]*)").expect("valid value regex"));

/// Extracts [`RegionInfo`] from the markup of a `ridelogstats` page.
///
/// # Errors
///
/// - [`ScraperError::MissingElement`] if the statistics container is absent.
/// - [`ScraperError::UnexpectedItemCount`] unless exactly four items are found.
/// - [`ScraperError::InvalidNumber`] if an item carries no integer value.
pub fn parse_region_info(html: &str, context: &str) -> Result<RegionInfo, ScraperError> {
    let document = Html::parse_document(html);
    let container = document
        .select(&CONTAINER_SELECTOR)
        .next()
        .ok_or_else(|| ScraperError::MissingElement {
            selector: STATS_CONTAINER,
            context: context.to_owned(),
        })?;

    let items: Vec<String> = container.select(&ITEM_SELECTOR).map(|li| li.html()).collect();
    if items.len() != STATS_ITEM_COUNT {
        return Err(ScraperError::UnexpectedItemCount {
            expected: STATS_ITEM_COUNT,
            found: items.len(),
            context: context.to_owned(),
        });
    }

    let values = items
        .iter()
        .map(|item| parse_item_value(item, context))
        .collect::<Result<Vec<u64>, _>>()?;

    Ok(RegionInfo {
        total_ridelogs: values[0],
        unique_riders: values[1],
        trails_ridden: values[2],
        average_trails_per_ride: values[3],
    })
}

/// Pulls the comma-grouped integer out of one `<li>` element's markup.
fn parse_item_value(item_html: &str, context: &str) -> Result<u64, ScraperError> {
    let raw = VALUE_RE
        .captures(item_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ScraperError::InvalidNumber {
            value: item_html.to_owned(),
            context: context.to_owned(),
        })?;

    raw.replace(',', "")
        .parse::<u64>()
        .map_err(|_| ScraperError::InvalidNumber {
            value: raw.to_owned(),
            context: context.to_owned(),
        })
}

impl TrailforksClient {
    /// Fetches and parses the current ride-log statistics for `region`.
    ///
    /// Always hits the live page; nothing is cached.
    ///
    /// # Errors
    ///
    /// Transport errors from the fetch, or any error from [`parse_region_info`].
    pub async fn get_region_info(&self, region: &RegionSlug) -> Result<RegionInfo, ScraperError> {
        let url = self.ridelog_stats_url(region)?;
        let body = self.get_text(&url).await?;
        let info = parse_region_info(&body, url.as_str())?;
        tracing::info!(
            %region,
            total_ridelogs = info.total_ridelogs,
            unique_riders = info.unique_riders,
            "fetched region ride-log statistics"
        );
        Ok(info)
    }
}
