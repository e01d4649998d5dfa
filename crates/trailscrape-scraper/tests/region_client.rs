//! Integration tests for region validation, statistics and login.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made.

use trailscrape_core::{Credentials, RegionInfo, RegionSlug};
use trailscrape_scraper::{ClientSettings, ScraperError, TrailforksClient};
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> TrailforksClient {
    TrailforksClient::new(&ClientSettings {
        base_url: base_url.to_owned(),
        timeout_secs: 5,
        user_agent: "trailscrape-test/0.1".to_owned(),
        max_retries: 0,
        backoff_base_secs: 0,
        inter_request_delay_ms: 0,
        page_concurrency: 1,
    })
    .expect("failed to build test TrailforksClient")
}

fn region(slug: &str) -> RegionSlug {
    RegionSlug::new(slug).expect("valid test slug")
}

fn credentials() -> Credentials {
    Credentials {
        username: "rider".to_owned(),
        password: "hunter2".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Region validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn existing_region_is_valid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/region/squamish/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Squamish | Trailforks</title></head></html>"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let valid = client.is_valid_region(&region("squamish")).await;
    assert!(matches!(valid, Ok(true)), "expected Ok(true), got: {valid:?}");
}

#[tokio::test]
async fn error_title_marks_region_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/region/atlantis/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Error</title></head><body></body></html>"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let valid = client.is_valid_region(&region("atlantis")).await;
    assert!(matches!(valid, Ok(false)), "expected Ok(false), got: {valid:?}");
}

#[tokio::test]
async fn error_page_served_as_404_is_still_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/region/atlantis/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<title>Error</title>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .ensure_valid_region(&region("atlantis"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidRegion { ref region } if region == "atlantis"),
        "expected InvalidRegion, got: {err:?}"
    );
    assert!(err.to_string().contains("atlantis"));
}

#[tokio::test]
async fn server_error_propagates_instead_of_reporting_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/region/squamish/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .is_valid_region(&region("squamish"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 503, .. }),
        "expected UnexpectedStatus(503), got: {err:?}"
    );
}

#[tokio::test]
async fn transport_failure_propagates() {
    // Nothing listens on the mock server's port once it is dropped.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let client = test_client(&uri);
    let err = client
        .is_valid_region(&region("squamish"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Http(_)), "expected Http, got: {err:?}");
}

// ---------------------------------------------------------------------------
// Region statistics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_region_info_reads_positional_values() {
    let server = MockServer::start().await;
    let body = r#"<html><body>
        <div class="col-2 center">
          <ul>
            <li><span class="big">12,345</span> ridelogs</li>
            <li><span class="big">6,789</span> riders</li>
            <li><span class="big">100</span> trails ridden</li>
            <li><span class="big">3</span> trails per ride</li>
          </ul>
        </div></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/region/squamish/ridelogstats/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let info = client
        .get_region_info(&region("squamish"))
        .await
        .expect("should parse statistics");
    assert_eq!(
        info,
        RegionInfo {
            total_ridelogs: 12_345,
            unique_riders: 6_789,
            trails_ridden: 100,
            average_trails_per_ride: 3,
        }
    );
}

#[tokio::test]
async fn get_region_info_fails_on_missing_items() {
    let server = MockServer::start().await;
    let body = r#"<div class="col-2 center"><ul><li>1</li><li>2</li></ul></div>"#;
    Mock::given(method("GET"))
        .and(path("/region/squamish/ridelogstats/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_region_info(&region("squamish"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedItemCount { found: 2, .. }),
        "expected UnexpectedItemCount, got: {err:?}"
    );
}

#[tokio::test]
async fn get_region_info_propagates_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/region/squamish/ridelogstats/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_region_info(&region("squamish"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_posts_form_and_returns_authenticated_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .and(header_exists("content-type"))
        .and(body_string_contains("username=rider"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "tf_session=abc123; Path=/")
                .set_body_string("<html><body>Welcome back</body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let authed = test_client(&server.uri())
        .login(&credentials())
        .await
        .expect("login should succeed");
    assert_eq!(authed.username(), "rider");
}

#[tokio::test]
async fn login_session_cookie_is_sent_on_later_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "tf_session=abc123; Path=/")
                .set_body_string("<html><body>Welcome back</body></html>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/region/squamish/"))
        .and(wiremock::matchers::header("cookie", "tf_session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Squamish</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let authed = test_client(&server.uri())
        .login(&credentials())
        .await
        .expect("login should succeed");
    let valid = authed
        .client()
        .is_valid_region(&region("squamish"))
        .await
        .expect("probe should succeed");
    assert!(valid);
}

#[tokio::test]
async fn login_rejected_when_form_is_shown_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<form><input name="username"><input type="password" name="password"></form>"#,
        ))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .login(&credentials())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::AuthenticationFailed { ref username } if username == "rider"),
        "expected AuthenticationFailed, got: {err:?}"
    );
}

#[tokio::test]
async fn login_server_error_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .login(&credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 500, .. }));
}
