// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Google Tasks authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No credentials configured.
    #[serde(rename = "none")]
    #[default]
    None,
    /// A fixed access token.
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
    /// OAuth 2.0 refresh token grant.
    #[serde(rename = "oauth")]
    OAuth {
        /// OAuth client id.
        client_id: String,
        /// OAuth client secret, absent for public clients.
        #[serde(default)]
        client_secret: Option<String>,
        /// Long-lived refresh token.
        refresh_token: String,
        /// Token endpoint.
        #[serde(default = "default_token_url")]
        token_url: String,
    },
}

/// Google Tasks server configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GTasksConfig {
    /// Base URL of the Tasks API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://tasks.googleapis.com".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("tasksync-gtasks/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for GTasksConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}
