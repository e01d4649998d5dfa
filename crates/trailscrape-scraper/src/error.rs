use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("{region} is not a valid Trailforks Region.")]
    InvalidRegion { region: String },

    #[error("login rejected for user {username}")]
    AuthenticationFailed { username: String },

    #[error("expected element {selector} not found in {context}")]
    MissingElement {
        selector: &'static str,
        context: String,
    },

    #[error("expected {expected} list items in {context}, found {found}")]
    UnexpectedItemCount {
        expected: usize,
        found: usize,
        context: String,
    },

    #[error("non-numeric value \"{value}\" in {context}")]
    InvalidNumber { value: String, context: String },

    #[error("no tables found at {url}")]
    NoTables { url: String },

    #[error("ride-log crawl for {region} collected no tables")]
    EmptyCrawl {
        region: String,
        #[source]
        cause: Option<Box<ScraperError>>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
