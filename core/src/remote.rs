// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Interfaces of the remote side: the list client, sessions and credentials.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RemoteError;
use crate::types::{ItemQuery, ListId, ListSummary, Page, RemoteItem, RemotePayload};

/// Authenticated access to a remote list service.
///
/// Every request takes a cancellation token; implementations should give up
/// with [`RemoteError::Cancelled`] as soon as it fires.
#[async_trait]
pub trait RemoteListClient: Send + Sync {
    /// Lists all remote lists.
    async fn query_lists(&self, cancel: &CancellationToken)
    -> Result<Vec<ListSummary>, RemoteError>;

    /// Fetches metadata of one list, without its items.
    async fn get_list(
        &self,
        list: &ListId,
        cancel: &CancellationToken,
    ) -> Result<ListSummary, RemoteError>;

    /// Fetches one page of items.
    async fn query_items(
        &self,
        list: &ListId,
        query: &ItemQuery,
        cancel: &CancellationToken,
    ) -> Result<Page<RemoteItem>, RemoteError>;

    /// Creates an item.
    async fn insert_item(
        &self,
        list: &ListId,
        payload: &RemotePayload,
        cancel: &CancellationToken,
    ) -> Result<RemoteItem, RemoteError>;

    /// Updates an existing item identified by `payload.id`.
    async fn update_item(
        &self,
        list: &ListId,
        payload: &RemotePayload,
        cancel: &CancellationToken,
    ) -> Result<RemoteItem, RemoteError>;

    /// Moves an item under another parent.
    async fn move_item(
        &self,
        list: &ListId,
        id: &str,
        parent: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<RemoteItem, RemoteError>;

    /// Deletes the item identified by `payload.id`.
    async fn delete_item(
        &self,
        list: &ListId,
        payload: &RemotePayload,
        cancel: &CancellationToken,
    ) -> Result<(), RemoteError>;
}

/// Opens sessions against one kind of remote service.
pub trait SessionFactory: Send + Sync {
    /// The client type of an open session.
    type Client: RemoteListClient;

    /// Opens a session authorized with the given token.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be set up.
    fn open_session(&self, token: AccessToken) -> Result<Self::Client, RemoteError>;
}

/// Supplies access tokens, obtaining or refreshing them as needed.
#[async_trait]
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Returns a valid access token.
    async fn access_token(&self, cancel: &CancellationToken) -> Result<AccessToken, RemoteError>;

    /// Forgets any cached token, so the next call obtains a fresh one.
    async fn invalidate(&self) {}
}

/// A bearer access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new `AccessToken` from a string.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the secret value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Runs a request, giving up with [`RemoteError::Cancelled`] when the token fires.
///
/// # Errors
///
/// Returns the request's error, or `Cancelled`.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    if cancel.is_cancelled() {
        return Err(RemoteError::Cancelled);
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(RemoteError::Cancelled),
        res = fut => res,
    }
}
