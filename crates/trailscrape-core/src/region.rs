//! Region identity and ride-log statistics.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Human-readable Trailforks region identifier as it appears in URLs,
/// e.g. `"duthie-hill-mountain-bike-park"`.
///
/// The numeric region id used by the trail export is a separate value; the
/// two cannot be derived from one another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionSlug(String);

impl RegionSlug {
    /// Validates and wraps a region slug.
    ///
    /// The slug is interpolated into URL paths and output file names, so it
    /// must be non-empty and free of whitespace, path separators and URL
    /// delimiters.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRegionSlug`] when the slug fails those checks.
    pub fn new(slug: impl Into<String>) -> Result<Self, CoreError> {
        let slug = slug.into();
        let reason = if slug.is_empty() {
            Some("slug is empty")
        } else if slug.chars().any(char::is_whitespace) {
            Some("slug contains whitespace")
        } else if slug.contains(['/', '\\', '?', '#', '&']) {
            Some("slug contains a URL or path delimiter")
        } else if slug == "." || slug == ".." {
            Some("slug is a relative path component")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidRegionSlug {
                slug,
                reason: reason.to_string(),
            }),
            None => Ok(Self(slug)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RegionSlug {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RegionSlug {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionSlug> for String {
    fn from(value: RegionSlug) -> Self {
        value.0
    }
}

/// Ride-log summary statistics shown on a region's `ridelogstats` page.
///
/// All four fields are always present; extraction fails instead of
/// producing a partially filled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub total_ridelogs: u64,
    pub unique_riders: u64,
    pub trails_ridden: u64,
    pub average_trails_per_ride: u64,
}
