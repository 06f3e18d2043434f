// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Credential providers for the Tasks API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tasksync_core::{AccessToken, CredentialProvider, RemoteError, cancellable};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::{AuthMethod, GTasksConfig};
use crate::error::GTasksError;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: SignedDuration = SignedDuration::from_secs(60);

/// A fixed access token.
///
/// A rejected static token cannot be renewed, so [`CredentialProvider::invalidate`]
/// does nothing.
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    /// Wraps the given token.
    #[must_use]
    pub const fn new(token: AccessToken) -> Self {
        Self(token)
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self, cancel: &CancellationToken) -> Result<AccessToken, RemoteError> {
        if cancel.is_cancelled() {
            return Err(RemoteError::Cancelled);
        }
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges a refresh token for short-lived access tokens.
///
/// The current access token is cached until shortly before it expires.
#[derive(Debug)]
pub struct OAuthRefresh {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
    refresh_token: String,
    cached: Mutex<Option<(AccessToken, Timestamp)>>,
}

impl OAuthRefresh {
    /// Creates a provider for the given OAuth client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(
        token_url: String,
        client_id: String,
        client_secret: Option<String>,
        refresh_token: String,
        timeout: Duration,
    ) -> Result<Self, GTasksError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token_url,
            client_id,
            client_secret,
            refresh_token,
            cached: Mutex::new(None),
        })
    }

    async fn refresh(&self) -> Result<(AccessToken, Timestamp), GTasksError> {
        tracing::debug!(url = %self.token_url, "refreshing access token");
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", self.refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let resp = self.client.post(&self.token_url).form(&form).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            let err: TokenErrorResponse = serde_json::from_str(&text).unwrap_or_default();
            let rejected = status == StatusCode::UNAUTHORIZED
                || (status == StatusCode::BAD_REQUEST && err.error == "invalid_grant");
            return Err(if rejected {
                GTasksError::Auth(err.error_description.unwrap_or(err.error))
            } else {
                GTasksError::Status {
                    status: status.as_u16(),
                    message: text,
                }
            });
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        let lifetime = SignedDuration::from_secs(token.expires_in.unwrap_or(3600));
        let expiry = Timestamp::now().saturating_add(lifetime).unwrap_or(Timestamp::MAX);
        Ok((AccessToken::new(token.access_token), expiry))
    }
}

#[async_trait]
impl CredentialProvider for OAuthRefresh {
    async fn access_token(&self, cancel: &CancellationToken) -> Result<AccessToken, RemoteError> {
        let mut cached = self.cached.lock().await;
        if let Some((token, expiry)) = cached.as_ref() {
            let fresh_until = expiry.saturating_sub(REFRESH_MARGIN).unwrap_or(Timestamp::MIN);
            if Timestamp::now() < fresh_until {
                return Ok(token.clone());
            }
        }

        let (token, expiry) = cancellable(cancel, async {
            self.refresh().await.map_err(|e| {
                tracing::warn!(err = %e, "token refresh failed");
                RemoteError::from(e)
            })
        })
        .await?;
        tracing::debug!(%expiry, "access token refreshed");
        *cached = Some((token.clone(), expiry));
        Ok(token)
    }

    async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}

/// Builds the credential provider for the configured authentication method.
///
/// # Errors
///
/// Returns an error if no credentials are configured.
pub fn credentials_from(
    config: &GTasksConfig,
) -> Result<Arc<dyn CredentialProvider>, GTasksError> {
    match &config.auth {
        AuthMethod::None => Err(GTasksError::Config(
            "no credentials configured".to_string(),
        )),
        AuthMethod::Bearer { token } => Ok(Arc::new(StaticToken::new(AccessToken::new(
            token.clone(),
        )))),
        AuthMethod::OAuth {
            client_id,
            client_secret,
            refresh_token,
            token_url,
        } => Ok(Arc::new(OAuthRefresh::new(
            token_url.clone(),
            client_id.clone(),
            client_secret.clone(),
            refresh_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
    }
}
