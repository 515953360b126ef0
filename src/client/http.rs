//! HTTP transport helpers
//!
//! This module handles the requests the client sends, including:
//! - Building the HTTP client with a cookie store and user agent
//! - GET requests for content pages (must answer 200)
//! - Form POSTs (Shaarli answers a successful submission with a 302)
//! - Error classification

use crate::config::UserAgentConfig;
use crate::{Result, ShaarliError};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client suitable for talking to Shaarli
///
/// Redirects are not followed: a form submission is recognised by its 302.
/// Cookies are kept so a login lasts for the life of the client.
///
/// # Example
///
/// ```no_run
/// use shaarli_client::client::build_http_client;
/// use shaarli_client::config::UserAgentConfig;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    // Format: Name/Version
    let user_agent = format!("{}/{}", config.name, config.version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a content page and returns its body
///
/// # Returns
///
/// * `Ok(String)` - The page body, status was 200
/// * `Err(ShaarliError::UnexpectedStatus)` - Any other status
/// * `Err(ShaarliError::Http)` - Connection, timeout or body read failure
pub(crate) async fn get_page(client: &Client, url: &Url) -> Result<String> {
    tracing::trace!("GET {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| http_error(url, source))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(unexpected_status(url, status, StatusCode::OK));
    }

    response.text().await.map_err(|source| http_error(url, source))
}

/// Sends a GET request and returns the status only
pub(crate) async fn get_status(client: &Client, url: &Url) -> Result<StatusCode> {
    tracing::trace!("GET {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| http_error(url, source))?;

    Ok(response.status())
}

/// Submits a url-encoded form, expecting a redirect
pub(crate) async fn post_form(client: &Client, url: &Url, form: &[(&str, &str)]) -> Result<()> {
    tracing::trace!("POST {}", url);
    let response = client
        .post(url.clone())
        .form(form)
        .send()
        .await
        .map_err(|source| http_error(url, source))?;

    let status = response.status();
    if status != StatusCode::FOUND {
        // Shaarli explains a rejected form in the page it renders
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Form rejected by {} ({}): {}", url, status, body);
        return Err(unexpected_status(url, status, StatusCode::FOUND));
    }

    Ok(())
}

fn http_error(url: &Url, source: reqwest::Error) -> ShaarliError {
    ShaarliError::Http {
        url: url.to_string(),
        source,
    }
}

fn unexpected_status(url: &Url, status: StatusCode, expected: StatusCode) -> ShaarliError {
    ShaarliError::UnexpectedStatus {
        url: url.to_string(),
        status: status.as_u16(),
        expected: expected.as_u16(),
    }
}
