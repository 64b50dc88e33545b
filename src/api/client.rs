//! Shared HTTP client for the backend API.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::FeedResult;

/// Thin wrapper around `reqwest::Client` that carries the base URL, HTTP
/// basic credentials and the per-fetch timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ApiClient {
    /// Create a client for the given base URL.
    pub fn new(
        base_url: &str,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> FeedResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    /// GET a JSON body from `path` (relative to the base URL).
    ///
    /// Non-2xx responses and body-decode failures are fetch failures like
    /// any transport error.
    pub async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> FeedResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        tracing::debug!("Fetching {}", url);
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
