//! Ride-log crawl over a region's paginated table view.
//!
//! The page count is derived from the ride-log total on the statistics page,
//! assuming a fixed page size. Pages are consumed strictly in order; the
//! first page that fails to fetch or parse ends the crawl, and everything
//! collected before it is kept.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use trailscrape_core::RegionSlug;

use crate::classify::{select_tables, TableClassifier};
use crate::client::{AuthenticatedClient, TrailforksClient};
use crate::error::ScraperError;
use crate::output::{scraped_riders_path, write_output};
use crate::rate_limit::RequestPacer;
use crate::table::{parse_tables, DataTable};

/// Rows Trailforks shows per ride-log table page.
pub const RIDELOGS_PER_PAGE: u64 = 30;

/// Number of pages to request for `total_ridelogs` ride logs.
///
/// Rounds `total_ridelogs / 30` to the nearest integer, ties to even, so
/// `12345 / 30 = 411.5` gives 412 and a final partial page of fewer than
/// 15 rows is not requested.
#[must_use]
pub fn total_pages(total_ridelogs: u64) -> u64 {
    let quotient = total_ridelogs / RIDELOGS_PER_PAGE;
    let twice_remainder = (total_ridelogs % RIDELOGS_PER_PAGE) * 2;
    match twice_remainder.cmp(&RIDELOGS_PER_PAGE) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + quotient % 2,
    }
}

#[derive(Debug)]
enum CrawlState {
    Running,
    Exhausted,
    HaltedOnError { page: u64, cause: ScraperError },
}

/// How a crawl ended.
#[derive(Debug)]
pub enum CrawlTermination {
    /// Every page up to the computed page count was consumed.
    Exhausted,
    /// `page` failed; later pages were not consumed.
    HaltedOnError { page: u64, cause: ScraperError },
}

impl CrawlTermination {
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Consolidated crawl output plus the condition that ended the crawl.
#[derive(Debug)]
pub struct CrawlReport {
    pub table: DataTable,
    pub total_pages: u64,
    /// Pages fetched and parsed successfully.
    pub pages_fetched: u64,
    /// Tables kept after per-page classification.
    pub tables_kept: usize,
    pub termination: CrawlTermination,
}

impl TrailforksClient {
    /// Fetches one ride-log table page and parses every table on it.
    ///
    /// # Errors
    ///
    /// - Transport errors from the fetch (after retries).
    /// - [`ScraperError::NoTables`] if the page has no table.
    pub async fn fetch_ridelog_page(
        &self,
        region: &RegionSlug,
        page: u64,
    ) -> Result<Vec<DataTable>, ScraperError> {
        let url = self.ridelog_page_url(region, page)?;
        let body = self.get_text_with_retry(&url).await?;
        let tables = parse_tables(&body);
        if tables.is_empty() {
            return Err(ScraperError::NoTables {
                url: url.to_string(),
            });
        }
        tracing::debug!(%region, page, tables = tables.len(), "parsed ride-log page");
        Ok(tables)
    }
}

impl AuthenticatedClient {
    /// Crawls pages `1..=total_pages` and concatenates the ride-log tables.
    ///
    /// Up to `page_concurrency` pages are requested ahead, with request
    /// starts spaced by the configured inter-request delay, but results are
    /// consumed in page order and the first failure halts the crawl exactly
    /// as in a sequential run. `on_page` is called once per consumed page,
    /// including the failing one.
    pub async fn crawl_ridelogs(
        &self,
        region: &RegionSlug,
        total_pages: u64,
        classifier: &dyn TableClassifier,
        on_page: &mut dyn FnMut(u64),
    ) -> CrawlReport {
        let client = self.client();
        let pacer = &RequestPacer::new(Duration::from_millis(client.inter_request_delay_ms));

        let pages = futures::stream::iter(1..=total_pages)
            .map(move |page| async move {
                pacer.wait().await;
                (page, client.fetch_ridelog_page(region, page).await)
            })
            .buffered(client.page_concurrency);
        let mut pages = std::pin::pin!(pages);

        let mut kept: Vec<DataTable> = Vec::new();
        let mut pages_fetched = 0u64;
        let mut state = CrawlState::Running;

        while matches!(state, CrawlState::Running) {
            state = match pages.next().await {
                None => CrawlState::Exhausted,
                Some((page, Ok(tables))) => {
                    kept.extend(select_tables(tables, classifier));
                    pages_fetched += 1;
                    on_page(page);
                    CrawlState::Running
                }
                Some((page, Err(cause))) => {
                    on_page(page);
                    CrawlState::HaltedOnError { page, cause }
                }
            };
        }

        let termination = match state {
            CrawlState::HaltedOnError { page, cause } => {
                tracing::warn!(
                    %region,
                    page,
                    total_pages,
                    error = %cause,
                    "ride-log crawl halted; keeping pages fetched so far"
                );
                CrawlTermination::HaltedOnError { page, cause }
            }
            CrawlState::Running | CrawlState::Exhausted => CrawlTermination::Exhausted,
        };

        let tables_kept = kept.len();
        CrawlReport {
            table: DataTable::concat(kept),
            total_pages,
            pages_fetched,
            tables_kept,
            termination,
        }
    }

    /// Crawls every ride-log page of `region` and writes the consolidated
    /// table to `{output_dir}/{region}_scraped_riders.csv`.
    ///
    /// The region is validated first and the page count comes from the live
    /// statistics page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidRegion`] if the region page is the error page.
    /// - Transport and parse errors from validation or the statistics page.
    /// - [`ScraperError::EmptyCrawl`] if not a single table was collected;
    ///   nothing is written in that case.
    /// - [`ScraperError::Csv`] / [`ScraperError::Io`] if the output cannot be written.
    pub async fn download_all_region_ridelogs(
        &self,
        region: &RegionSlug,
        output_dir: &Path,
        classifier: &dyn TableClassifier,
        on_start: &mut dyn FnMut(u64),
        on_page: &mut dyn FnMut(u64),
    ) -> Result<(CrawlReport, PathBuf), ScraperError> {
        self.client().ensure_valid_region(region).await?;

        let info = self.client().get_region_info(region).await?;
        let pages = total_pages(info.total_ridelogs);
        tracing::info!(%region, total_ridelogs = info.total_ridelogs, pages, "starting ride-log crawl");
        on_start(pages);

        let report = self.crawl_ridelogs(region, pages, classifier, on_page).await;
        if report.tables_kept == 0 {
            let cause = match report.termination {
                CrawlTermination::HaltedOnError { cause, .. } => Some(Box::new(cause)),
                CrawlTermination::Exhausted => None,
            };
            return Err(ScraperError::EmptyCrawl {
                region: region.to_string(),
                cause,
            });
        }

        let path = scraped_riders_path(output_dir, region);
        let csv = report.table.to_csv_bytes()?;
        write_output(&path, &csv).await?;
        tracing::info!(
            %region,
            rows = report.table.len(),
            pages_fetched = report.pages_fetched,
            path = %path.display(),
            "wrote ride-log table"
        );

        Ok((report, path))
    }
}
