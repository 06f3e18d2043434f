// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use tasksync_core::RemoteError;

/// Google Tasks client errors.
#[non_exhaustive]
#[derive(Debug)]
pub enum GTasksError {
    /// HTTP layer error.
    Http(String),

    /// The server could not be reached, or the request timed out.
    Network(String),

    /// The server answered with an unexpected status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// A response body could not be decoded.
    Decode(String),

    /// Authentication error.
    Auth(String),

    /// Configuration error.
    Config(String),
}

impl GTasksError {
    /// The HTTP status of the response, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for GTasksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Network(e) => write!(f, "Network error: {e}"),
            Self::Status { status, message } if message.is_empty() => {
                write!(f, "Unexpected status {status}")
            }
            Self::Status { status, message } => write!(f, "Unexpected status {status}: {message}"),
            Self::Decode(e) => write!(f, "Invalid response body: {e}"),
            Self::Auth(e) => write!(f, "Authentication failed: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for GTasksError {}

impl From<reqwest::Error> for GTasksError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Self::Network(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GTasksError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<GTasksError> for RemoteError {
    fn from(e: GTasksError) -> Self {
        match e {
            GTasksError::Network(_) => Self::TransientNetwork(e.to_string()),
            GTasksError::Status { status, .. } => match status {
                401 | 403 => Self::AuthRejected(e.to_string()),
                404 | 410 => Self::NotFound(e.to_string()),
                408 | 429 | 500..=599 => Self::TransientNetwork(e.to_string()),
                _ => Self::Other(e.to_string()),
            },
            GTasksError::Decode(_) => Self::InvalidPayload(e.to_string()),
            GTasksError::Auth(_) => Self::AuthRejected(e.to_string()),
            GTasksError::Http(_) | GTasksError::Config(_) => Self::Other(e.to_string()),
        }
    }
}
