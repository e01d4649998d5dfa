//! Login and the authenticated-session capability.

use trailscrape_core::Credentials;

use crate::error::ScraperError;

use super::TrailforksClient;

/// Marker that is only present while the login form is still being shown,
/// i.e. when the submitted credentials were rejected.
const LOGIN_FORM_MARKER: &str = "name=\"password\"";

/// A [`TrailforksClient`] whose cookie store holds a logged-in session.
///
/// Can only be obtained through [`TrailforksClient::login`], so holding one
/// is proof that the login step ran and succeeded. The trail export and
/// ride-log crawl are only reachable through this type.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    pub(crate) inner: TrailforksClient,
    username: String,
}

impl AuthenticatedClient {
    /// The public-page client sharing this session's cookies.
    #[must_use]
    pub fn client(&self) -> &TrailforksClient {
        &self.inner
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl TrailforksClient {
    /// Logs in with `credentials` and returns the authenticated capability.
    ///
    /// The session cookie set by the login response is kept in this client's
    /// cookie store; redirects after the form post are followed.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::AuthenticationFailed`] if the response still shows
    ///   the login form.
    /// - [`ScraperError::UnexpectedStatus`] on a non-2xx final response.
    /// - [`ScraperError::Http`] on network failure.
    pub async fn login(self, credentials: &Credentials) -> Result<AuthenticatedClient, ScraperError> {
        let url = self.login_url()?;
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("submit", "Login"),
            ("source", ""),
        ];

        let response = self.client.post(url.clone()).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if body.contains(LOGIN_FORM_MARKER) {
            tracing::warn!(username = %credentials.username, "trailforks login rejected");
            return Err(ScraperError::AuthenticationFailed {
                username: credentials.username.clone(),
            });
        }

        tracing::info!(username = %credentials.username, "logged in to trailforks");
        Ok(AuthenticatedClient {
            inner: self,
            username: credentials.username.clone(),
        })
    }
}
