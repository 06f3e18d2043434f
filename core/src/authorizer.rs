// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Connection lifecycle: credentials, session and list resolution.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{AuthError, RemoteError};
use crate::remote::{CredentialProvider, RemoteListClient, SessionFactory};
use crate::types::{ConnectionState, ListId};

/// An authorized session bound to one remote list.
#[derive(Debug)]
pub struct Session<C> {
    client: C,
    list: ListId,
    degraded_query: bool,
}

impl<C> Session<C> {
    fn new(client: C, list: ListId) -> Self {
        Self {
            client,
            list,
            degraded_query: false,
        }
    }

    /// The remote client of this session.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The list this session is bound to.
    pub const fn list(&self) -> &ListId {
        &self.list
    }

    /// Whether the server refused bounded item queries on this connection.
    pub const fn degraded_query(&self) -> bool {
        self.degraded_query
    }

    pub(crate) fn set_degraded_query(&mut self) {
        self.degraded_query = true;
    }
}

/// Holds credentials and establishes sessions.
pub struct Authorizer<F: SessionFactory> {
    factory: F,
    credentials: Arc<dyn CredentialProvider>,
    state: ConnectionState,
    session: Option<Session<F::Client>>,
}

impl<F: SessionFactory> fmt::Debug for Authorizer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("credentials", &self.credentials)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<F: SessionFactory> Authorizer<F> {
    /// Creates a disconnected authorizer.
    pub fn new(factory: F, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            factory,
            credentials,
            state: ConnectionState::Disconnected,
            session: None,
        }
    }

    /// The current connection state.
    pub const fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// The current session, if connected.
    pub const fn session(&self) -> Option<&Session<F::Client>> {
        self.session.as_ref()
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut Session<F::Client>> {
        self.session.as_mut()
    }

    /// Establishes a session, or reuses the current one.
    ///
    /// When `configured` is `None` the first remote list is adopted, falling
    /// back to [`ListId::DEFAULT`].
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are rejected, the server cannot be
    /// reached, or the attempt is cancelled. The authorizer is left
    /// disconnected in that case.
    pub async fn connect(
        &mut self,
        configured: Option<&ListId>,
        cancel: &CancellationToken,
    ) -> Result<ConnectionState, AuthError> {
        if let Some(session) = &self.session {
            return Ok(ConnectionState::Connected(session.list.clone()));
        }

        self.state = ConnectionState::Authorizing;
        match self.open(configured, cancel).await {
            Ok(session) => {
                tracing::info!(list = %session.list, "connected");
                self.state = ConnectionState::Connected(session.list.clone());
                self.session = Some(session);
                Ok(self.state.clone())
            }
            Err(e) => {
                tracing::warn!(err = %e, "connect failed");
                self.state = ConnectionState::Disconnected;
                if matches!(e, AuthError::AuthRejected(_)) {
                    self.credentials.invalidate().await;
                }
                Err(e)
            }
        }
    }

    /// Releases the session. Safe to call in any state.
    pub fn disconnect(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("session released");
        }
        self.state = ConnectionState::Disconnected;
    }

    async fn open(
        &self,
        configured: Option<&ListId>,
        cancel: &CancellationToken,
    ) -> Result<Session<F::Client>, AuthError> {
        let token = self.credentials.access_token(cancel).await?;
        let client = self.factory.open_session(token)?;
        let list = resolve_list(&client, configured, cancel).await?;
        Ok(Session::new(client, list))
    }
}

/// Picks the list to bind to.
///
/// Listing also verifies the credentials, so auth and network failures abort
/// the connect; other failures only lose the ability to pick the first list.
async fn resolve_list<C: RemoteListClient>(
    client: &C,
    configured: Option<&ListId>,
    cancel: &CancellationToken,
) -> Result<ListId, AuthError> {
    let first = match client.query_lists(cancel).await {
        Ok(lists) => lists.into_iter().map(|a| a.id).find(|id| !id.is_empty()),
        Err(
            e @ (RemoteError::AuthRejected(_)
            | RemoteError::TransientNetwork(_)
            | RemoteError::Cancelled),
        ) => return Err(e.into()),
        Err(e) => {
            tracing::warn!(err = %e, "failed to list remote lists");
            None
        }
    };

    let list = match configured {
        Some(list) => list.clone(),
        None => first.unwrap_or_else(|| {
            tracing::warn!("no remote list found, using the default list");
            ListId::default_list()
        }),
    };
    Ok(list)
}
