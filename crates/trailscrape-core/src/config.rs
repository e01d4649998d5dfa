use crate::app_config::{AppConfig, Credentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid or only half of the
/// Trailforks credentials are set.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid or only half of the
/// Trailforks credentials are set.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let base_url = or_default("TRAILSCRAPE_BASE_URL", "https://www.trailforks.com");
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "TRAILSCRAPE_BASE_URL".to_string(),
            reason: format!("\"{base_url}\" is not an http(s) URL"),
        });
    }

    let credentials = match (
        lookup("TRAILFORKS_USERNAME").ok(),
        lookup("TRAILFORKS_PASSWORD").ok(),
    ) {
        (Some(username), Some(password)) => Some(Credentials { username, password }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvVar("TRAILFORKS_PASSWORD".to_string()))
        }
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnvVar("TRAILFORKS_USERNAME".to_string()))
        }
    };

    let log_level = or_default("TRAILSCRAPE_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("TRAILSCRAPE_OUTPUT_DIR", "."));

    let request_timeout_secs = parse_u64("TRAILSCRAPE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("TRAILSCRAPE_USER_AGENT", "trailscrape/0.1 (region-harvest)");
    let max_retries = parse_u32("TRAILSCRAPE_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("TRAILSCRAPE_RETRY_BACKOFF_BASE_SECS", "2")?;
    let inter_request_delay_ms = parse_u64("TRAILSCRAPE_INTER_REQUEST_DELAY_MS", "250")?;

    let page_concurrency = parse_usize("TRAILSCRAPE_PAGE_CONCURRENCY", "1")?;
    if page_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TRAILSCRAPE_PAGE_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        base_url,
        credentials,
        log_level,
        output_dir,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        inter_request_delay_ms,
        page_concurrency,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.base_url, "https://www.trailforks.com");
        assert!(cfg.credentials.is_none());
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.output_dir.to_str(), Some("."));
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "trailscrape/0.1 (region-harvest)");
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.retry_backoff_base_secs, 2);
        assert_eq!(cfg.inter_request_delay_ms, 250);
        assert_eq!(cfg.page_concurrency, 1);
    }

    #[test]
    fn build_app_config_reads_credentials() {
        let mut map = HashMap::new();
        map.insert("TRAILFORKS_USERNAME", "rider");
        map.insert("TRAILFORKS_PASSWORD", "hunter2");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let creds = cfg.credentials.expect("credentials should be set");
        assert_eq!(creds.username, "rider");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn build_app_config_fails_with_username_only() {
        let mut map = HashMap::new();
        map.insert("TRAILFORKS_USERNAME", "rider");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TRAILFORKS_PASSWORD"),
            "expected MissingEnvVar(TRAILFORKS_PASSWORD), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_password_only() {
        let mut map = HashMap::new();
        map.insert("TRAILFORKS_PASSWORD", "hunter2");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TRAILFORKS_USERNAME"),
            "expected MissingEnvVar(TRAILFORKS_USERNAME), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_non_http_base_url() {
        let mut map = HashMap::new();
        map.insert("TRAILSCRAPE_BASE_URL", "ftp://trailforks.com");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRAILSCRAPE_BASE_URL"),
            "expected InvalidEnvVar(TRAILSCRAPE_BASE_URL), got: {result:?}"
        );
    }

    #[test]
    fn request_timeout_secs_override() {
        let mut map = HashMap::new();
        map.insert("TRAILSCRAPE_REQUEST_TIMEOUT_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.request_timeout_secs, 60);
    }

    #[test]
    fn request_timeout_secs_invalid() {
        let mut map = HashMap::new();
        map.insert("TRAILSCRAPE_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRAILSCRAPE_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(TRAILSCRAPE_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn max_retries_invalid() {
        let mut map = HashMap::new();
        map.insert("TRAILSCRAPE_MAX_RETRIES", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRAILSCRAPE_MAX_RETRIES"),
            "expected InvalidEnvVar(TRAILSCRAPE_MAX_RETRIES), got: {result:?}"
        );
    }

    #[test]
    fn page_concurrency_override() {
        let mut map = HashMap::new();
        map.insert("TRAILSCRAPE_PAGE_CONCURRENCY", "4");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.page_concurrency, 4);
    }

    #[test]
    fn page_concurrency_zero_is_rejected() {
        let mut map = HashMap::new();
        map.insert("TRAILSCRAPE_PAGE_CONCURRENCY", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRAILSCRAPE_PAGE_CONCURRENCY"),
            "expected InvalidEnvVar(TRAILSCRAPE_PAGE_CONCURRENCY), got: {result:?}"
        );
    }

    #[test]
    fn debug_output_redacts_password() {
        let mut map = HashMap::new();
        map.insert("TRAILFORKS_USERNAME", "rider");
        map.insert("TRAILFORKS_PASSWORD", "hunter2");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("rider"));
        assert!(!rendered.contains("hunter2"));
    }
}
