// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the sync engine.

use std::fmt;

use thiserror::Error;

use crate::types::ListId;

/// Error kinds shared by every error of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or expired credentials; the caller should re-prompt.
    AuthRejected,
    /// Network trouble; the caller may retry later.
    TransientNetwork,
    /// The server rejected a query parameter.
    MalformedQueryParameter,
    /// A non-success status that actually means success.
    ProtocolQuirkSuccess,
    /// The item does not exist.
    NotFound,
    /// A payload could not be mapped.
    InvalidPayload,
    /// The operation was cancelled.
    Cancelled,
    /// The engine has no session.
    NotConnected,
    /// The revision store failed.
    Store,
    /// Anything else.
    Other,
}

/// Errors reported by a [`RemoteListClient`](crate::RemoteListClient) or a
/// [`CredentialProvider`](crate::CredentialProvider).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Credentials were rejected.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// Connection dropped, timed out, or the server is temporarily unavailable.
    #[error("network error: {0}")]
    TransientNetwork(String),

    /// The server refused a query parameter.
    #[error("malformed query parameter: {0}")]
    MalformedQueryParameter(String),

    /// The server reported an error for a request that succeeded.
    #[error("request succeeded with an unexpected response: {0}")]
    ProtocolQuirkSuccess(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server sent data that could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The request was cancelled.
    #[error("cancelled")]
    Cancelled,

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthRejected(_) => ErrorKind::AuthRejected,
            Self::TransientNetwork(_) => ErrorKind::TransientNetwork,
            Self::MalformedQueryParameter(_) => ErrorKind::MalformedQueryParameter,
            Self::ProtocolQuirkSuccess(_) => ErrorKind::ProtocolQuirkSuccess,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

/// Errors of the [`Authorizer`](crate::Authorizer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credentials were rejected; re-prompt the user.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// The server could not be reached; try again later.
    #[error("network error: {0}")]
    TransientNetwork(String),

    /// The attempt was cancelled.
    #[error("connect cancelled")]
    Cancelled,

    /// Any other failure, fatal for this attempt.
    #[error("connect failed: {0}")]
    Other(String),
}

impl AuthError {
    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthRejected(_) => ErrorKind::AuthRejected,
            Self::TransientNetwork(_) => ErrorKind::TransientNetwork,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

impl From<RemoteError> for AuthError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::AuthRejected(msg) => Self::AuthRejected(msg),
            RemoteError::TransientNetwork(msg) => Self::TransientNetwork(msg),
            RemoteError::Cancelled => Self::Cancelled,
            e => Self::Other(e.to_string()),
        }
    }
}

/// Errors of a [`RevisionStore`](crate::RevisionStore).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[cfg(any(feature = "sqlite", feature = "sqlite-unbundled"))]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[cfg(any(feature = "sqlite", feature = "sqlite-unbundled"))]
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A payload could not be (de)serialized.
    #[error("payload encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Operations of the engine, used to give errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Establishing a session.
    Connect,
    /// Polling for changes.
    Poll,
    /// Applying a change set or committing a cursor.
    Apply,
    /// Creating or updating an item.
    Save,
    /// Loading an item.
    Load,
    /// Deleting an item.
    Remove,
    /// Listing remote lists.
    ListLists,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connect => "connect",
            Self::Poll => "poll",
            Self::Apply => "apply",
            Self::Save => "save",
            Self::Load => "load",
            Self::Remove => "remove",
            Self::ListLists => "list lists",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the [`SyncEngine`](crate::SyncEngine).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SyncError {
    /// Connecting failed.
    #[error("connect failed: {0}")]
    Auth(#[from] AuthError),

    /// A remote request failed.
    #[error("{operation} on list {list} failed: {source}")]
    Remote {
        /// The failed operation.
        operation: Operation,
        /// The list the operation ran against.
        list: ListId,
        /// The remote error.
        #[source]
        source: RemoteError,
    },

    /// The revision store failed.
    #[error("{operation} failed in the revision store: {source}")]
    Store {
        /// The failed operation.
        operation: Operation,
        /// The store error.
        #[source]
        source: StoreError,
    },

    /// The engine has no session.
    #[error("{0} requires a connection")]
    NotConnected(Operation),

    /// The item is not known.
    #[error("item {id} not found")]
    NotFound {
        /// The item id.
        id: String,
    },

    /// A payload could not be mapped.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The operation was cancelled; try again later.
    #[error("{0} cancelled")]
    Cancelled(Operation),
}

impl SyncError {
    pub(crate) fn remote(operation: Operation, list: &ListId, source: RemoteError) -> Self {
        match source {
            RemoteError::Cancelled => Self::Cancelled(operation),
            source => Self::Remote {
                operation,
                list: list.clone(),
                source,
            },
        }
    }

    pub(crate) const fn store(operation: Operation, source: StoreError) -> Self {
        Self::Store { operation, source }
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(e) => e.kind(),
            Self::Remote { source, .. } => source.kind(),
            Self::Store { .. } => ErrorKind::Store,
            Self::NotConnected(_) => ErrorKind::NotConnected,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Returns true if the caller may retry the operation later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TransientNetwork | ErrorKind::Cancelled | ErrorKind::NotConnected
        )
    }
}
