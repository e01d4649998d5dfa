//! Output file naming and writing.

use std::path::{Path, PathBuf};

use trailscrape_core::RegionSlug;

use crate::error::ScraperError;

#[must_use]
pub fn trail_listing_path(output_dir: &Path, region: &RegionSlug) -> PathBuf {
    output_dir.join(format!("{region}_trail_listing.csv"))
}

#[must_use]
pub fn scraped_riders_path(output_dir: &Path, region: &RegionSlug) -> PathBuf {
    output_dir.join(format!("{region}_scraped_riders.csv"))
}

/// Writes `contents` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns [`ScraperError::Io`] if a directory or the file cannot be written.
pub async fn write_output(path: &Path, contents: &[u8]) -> Result<(), ScraperError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ScraperError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ScraperError::Io {
            path: path.to_path_buf(),
            source,
        })
}
