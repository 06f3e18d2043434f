// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and status handling.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tasksync_core::AccessToken;

use crate::config::GTasksConfig;
use crate::error::GTasksError;

/// HTTP client for Tasks API calls of one session.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: AccessToken,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or HTTP client creation fails.
    pub fn new(config: &GTasksConfig, token: AccessToken) -> Result<Self, GTasksError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GTasksError::Config(format!("Invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(GTasksError::Config(format!(
                "Invalid base URL {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Builds the URL of an API resource from its path segments.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["tasks", "v1"]).extend(segments);
        }
        url
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.token.secret())
    }

    /// Executes a request and checks for HTTP errors.
    ///
    /// Only `200 OK` and `201 Created` are successes; the body of any other
    /// response is kept in the error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns an unexpected status code.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, GTasksError> {
        let resp = req.send().await?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(resp),
            status => {
                let message = resp.text().await.unwrap_or_default();
                tracing::debug!(%status, "request failed");
                Err(GTasksError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Decodes a JSON response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be read or decoded.
    pub async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, GTasksError> {
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
