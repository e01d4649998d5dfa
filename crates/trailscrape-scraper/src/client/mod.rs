//! HTTP client for the Trailforks website.

mod auth;

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use trailscrape_core::{AppConfig, RegionSlug};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use auth::AuthenticatedClient;

/// Connection and pacing settings for [`TrailforksClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    /// Delay applied before every ride-log page request after the first.
    pub inter_request_delay_ms: u64,
    /// Number of ride-log pages fetched ahead of the one being consumed.
    pub page_concurrency: usize,
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
            inter_request_delay_ms: config.inter_request_delay_ms,
            page_concurrency: config.page_concurrency,
        }
    }
}

/// Client for the public Trailforks pages.
///
/// Holds a cookie store so that a successful [`TrailforksClient::login`]
/// carries the session into every later request. Operations that need a
/// logged-in session live on [`AuthenticatedClient`].
#[derive(Debug, Clone)]
pub struct TrailforksClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_secs: u64,
    pub(crate) inter_request_delay_ms: u64,
    pub(crate) page_concurrency: usize,
}

impl TrailforksClient {
    /// Builds a client from `settings`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    /// - [`ScraperError::InvalidBaseUrl`] if `settings.base_url` does not parse.
    pub fn new(settings: &ClientSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        // A trailing slash keeps `Url::join` appending to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries: settings.max_retries,
            backoff_base_secs: settings.backoff_base_secs,
            inter_request_delay_ms: settings.inter_request_delay_ms,
            page_concurrency: settings.page_concurrency.max(1),
        })
    }

    fn join(&self, path: &str) -> Result<Url, ScraperError> {
        self.base_url
            .join(path)
            .map_err(|e| ScraperError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })
    }

    pub(crate) fn region_url(&self, region: &RegionSlug) -> Result<Url, ScraperError> {
        self.join(&format!("region/{region}/"))
    }

    pub(crate) fn ridelog_stats_url(&self, region: &RegionSlug) -> Result<Url, ScraperError> {
        self.join(&format!("region/{region}/ridelogstats/"))
    }

    pub(crate) fn ridelog_page_url(
        &self,
        region: &RegionSlug,
        page: u64,
    ) -> Result<Url, ScraperError> {
        let mut url = self.join(&format!("region/{region}/ridelogs/"))?;
        url.query_pairs_mut()
            .append_pair("viewMode", "table")
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    pub(crate) fn export_url(&self, region_id: u64) -> Result<Url, ScraperError> {
        let mut url = self.join("tools/trailspreadsheet_csv/")?;
        url.query_pairs_mut()
            .append_pair("cols", &crate::export::EXPORT_COLUMNS.join(","))
            .append_pair("rid", &region_id.to_string());
        Ok(url)
    }

    pub(crate) fn login_url(&self) -> Result<Url, ScraperError> {
        self.join("login/")
    }

    fn get(&self, url: &Url) -> reqwest::RequestBuilder {
        self.client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,text/csv;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
    }

    /// Sends a single GET and returns the status with the body, without
    /// interpreting the status.
    pub(crate) async fn get_raw(&self, url: &Url) -> Result<(StatusCode, String), ScraperError> {
        let response = self.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Sends a single GET and maps non-2xx statuses to typed errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429.
    /// - [`ScraperError::NotFound`]: HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or TLS failure.
    pub(crate) async fn get_text(&self, url: &Url) -> Result<String, ScraperError> {
        let response = self.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScraperError::RateLimited {
                url: url.to_string(),
                retry_after_secs,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// [`Self::get_text`] wrapped in the configured retry policy.
    pub(crate) async fn get_text_with_retry(&self, url: &Url) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || self.get_text(url)).await
    }
}
