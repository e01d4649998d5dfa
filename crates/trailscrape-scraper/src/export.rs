//! Trail spreadsheet export for a region.
//!
//! Trailforks generates the CSV server-side. The body it returns contains
//! record breaks in the middle of quoted fields: a line break directly after
//! a letter, where `",` (close quote, field separator) belongs. The repair
//! pass rewrites exactly that pattern and nothing else, so a structural
//! check runs afterwards and reports how many records still look wrong.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use trailscrape_core::RegionSlug;

use crate::client::AuthenticatedClient;
use crate::error::ScraperError;
use crate::output::{trail_listing_path, write_output};

/// Columns requested from the export endpoint, in output order.
pub const EXPORT_COLUMNS: &[&str] = &[
    "trailid",
    "title",
    "aka",
    "activitytype",
    "difficulty",
    "status",
    "condition",
    "region_title",
    "rid",
    "difficulty_system",
    "trailtype",
    "usage",
    "direction",
    "season",
    "unsanctioned",
    "hidden",
    "rating",
    "ridden",
    "total_checkins",
    "total_reports",
    "total_photos",
    "total_videos",
    "faved",
    "views",
    "global_rank",
    "created",
    "land_manager",
    "closed",
    "wet_weather",
    "distance",
    "time",
    "alt_change",
    "alt_max",
    "alt_climb",
    "alt_descent",
    "grade",
    "dst_climb",
    "dst_descent",
    "dst_flat",
    "alias",
    "inventory_exclude",
    "trail_association",
    "sponsors",
    "builders",
    "maintainers",
];

static BROKEN_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])\r?\n").expect("valid repair regex"));

/// Replaces every line break that directly follows an ASCII letter with `",`.
///
/// The letter itself is kept: `Name\n` becomes `Name",`.
#[must_use]
pub fn repair_export_text(raw: &str) -> String {
    BROKEN_FIELD_RE.replace_all(raw, "${1}\",").into_owned()
}

/// Result of the structural check run on repaired export text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportCheck {
    /// Number of fields in the header record.
    pub header_fields: usize,
    /// Data records after the header.
    pub records: usize,
    /// Data records whose field count differs from the header.
    pub mismatched_records: usize,
    /// True if the text could not be tokenised as CSV at all.
    pub unparseable: bool,
}

impl ExportCheck {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.unparseable && self.mismatched_records == 0
    }
}

/// Parses `text` as CSV and counts records whose width differs from the header.
#[must_use]
pub fn check_export_csv(text: &str) -> ExportCheck {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut check = ExportCheck {
        header_fields: 0,
        records: 0,
        mismatched_records: 0,
        unparseable: false,
    };

    for (i, record) in reader.records().enumerate() {
        let Ok(record) = record else {
            check.unparseable = true;
            break;
        };
        if i == 0 {
            check.header_fields = record.len();
            continue;
        }
        check.records += 1;
        if record.len() != check.header_fields {
            check.mismatched_records += 1;
        }
    }

    check
}

/// What [`AuthenticatedClient::download_all_region_trails`] wrote.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub check: ExportCheck,
}

impl AuthenticatedClient {
    /// Downloads the trail spreadsheet for `region`, repairs it and writes it
    /// to `{output_dir}/{region}_trail_listing.csv`.
    ///
    /// `region_id` is the numeric id the export endpoint keys on; it is not
    /// derivable from the slug. The region is validated first.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidRegion`] if the region page is the error page.
    /// - Transport errors from validation or the download.
    /// - [`ScraperError::Io`] if the output cannot be written.
    pub async fn download_all_region_trails(
        &self,
        region: &RegionSlug,
        region_id: u64,
        output_dir: &Path,
    ) -> Result<ExportSummary, ScraperError> {
        self.client().ensure_valid_region(region).await?;

        let url = self.client().export_url(region_id)?;
        tracing::info!(%region, region_id, "requesting trail export");
        let raw = self.client().get_text_with_retry(&url).await?;

        let repaired = repair_export_text(&raw);
        let check = check_export_csv(&repaired);
        if check.is_consistent() {
            tracing::debug!(%region, records = check.records, "trail export is well-formed");
        } else {
            tracing::warn!(
                %region,
                records = check.records,
                mismatched = check.mismatched_records,
                unparseable = check.unparseable,
                "trail export still has malformed records after repair"
            );
        }

        let path = trail_listing_path(output_dir, region);
        write_output(&path, repaired.as_bytes()).await?;
        tracing::info!(%region, path = %path.display(), "wrote trail listing");

        Ok(ExportSummary {
            path,
            bytes_written: repaired.len(),
            check,
        })
    }
}
