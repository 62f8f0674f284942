use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::constants::{DELETE_PATH, LOGIN_PATH, USER_AGENT};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid forum URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Authenticated connection to the forum.
///
/// The client keeps a cookie store, so cookies set by [`ForumSession::login`]
/// ride along on every later page fetch and delete request.
#[derive(Debug, Clone)]
pub struct ForumSession {
    client: Client,
    base_url: Url,
    encoding: String,
}

impl ForumSession {
    /// Build a session from configuration. No request is made yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, SessionError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            encoding: config.page_encoding.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Log in with the forum credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the login request fails or is rejected by status.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let url = self.base_url.join(LOGIN_PATH)?;
        let form = [("id", username), ("passwd", password), ("kick_multi", "1")];

        let response = self.client.post(url.clone()).form(&form).send().await?;
        check_status(&url, response.status())?;

        info!(user = %username, "Logged in");
        Ok(())
    }

    /// Fetch a page and decode it with the configured charset.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn fetch_page(&self, url: &Url) -> Result<String, SessionError> {
        debug!(url = %url, "Fetching page");
        let response = self.client.get(url.clone()).send().await?;
        check_status(url, response.status())?;
        Ok(response.text_with_charset(&self.encoding).await?)
    }

    /// Post a delete payload and return the decoded response body.
    ///
    /// The forum answers with a page even on failure, so the status is not
    /// checked here.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn submit_delete(
        &self,
        payload: &BTreeMap<String, String>,
    ) -> Result<String, SessionError> {
        let url = self.base_url.join(DELETE_PATH)?;
        debug!(url = %url, file = ?payload.get("file"), "Submitting delete request");
        let response = self.client.post(url).form(payload).send().await?;
        Ok(response.text_with_charset(&self.encoding).await?)
    }
}

fn check_status(url: &Url, status: StatusCode) -> Result<(), SessionError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(SessionError::Status {
            url: url.to_string(),
            status,
        })
    }
}
