//! Region existence checks.

use trailscrape_core::RegionSlug;

use crate::client::TrailforksClient;
use crate::error::ScraperError;

/// Title Trailforks serves in place of a region page that does not exist.
pub const ERROR_TITLE_MARKER: &str = "<title>Error</title>";

/// Returns `true` when `body` is the Trailforks error page.
#[must_use]
pub fn is_error_page(body: &str) -> bool {
    body.contains(ERROR_TITLE_MARKER)
}

impl TrailforksClient {
    /// Checks whether `region` names an existing Trailforks region.
    ///
    /// Only the page body decides validity; the error page may come back
    /// with any 2xx or 4xx status. Never retried.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] on network failure.
    /// - [`ScraperError::UnexpectedStatus`] on a 5xx response.
    pub async fn is_valid_region(&self, region: &RegionSlug) -> Result<bool, ScraperError> {
        let url = self.region_url(region)?;
        let (status, body) = self.get_raw(&url).await?;
        if status.is_server_error() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let valid = !is_error_page(&body);
        tracing::debug!(%region, valid, "region validity probe");
        Ok(valid)
    }

    /// Like [`Self::is_valid_region`] but turns an invalid region into
    /// [`ScraperError::InvalidRegion`] so callers can gate further work with `?`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidRegion`] for a missing region, or any
    /// error from [`Self::is_valid_region`].
    pub async fn ensure_valid_region(&self, region: &RegionSlug) -> Result<(), ScraperError> {
        if self.is_valid_region(region).await? {
            Ok(())
        } else {
            Err(ScraperError::InvalidRegion {
                region: region.to_string(),
            })
        }
    }
}
