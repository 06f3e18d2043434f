// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The sync engine of one remote list.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::authorizer::{Authorizer, Session};
use crate::classifier::classify;
use crate::config::SyncConfig;
use crate::coordinator::SaveLoadCoordinator;
use crate::detector::{ChangeDetector, Detection};
use crate::error::{AuthError, Operation, RemoteError, SyncError};
use crate::mapper::DomainMapper;
use crate::reconnect::requires_reconnect;
use crate::remote::{CredentialProvider, RemoteListClient, SessionFactory};
use crate::store::RevisionStore;
use crate::types::{
    AuthoritativeItem, CachedItem, ChangeSet, ConnectionState, DataVersion, ListId, ListSummary,
    SyncCursor,
};

/// Result of [`SyncEngine::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<P> {
    /// Nothing changed since the last committed cursor.
    Unchanged,
    /// The list changed.
    Changed {
        /// Changes to apply to the cache.
        changes: ChangeSet<P>,
        /// Cursor to commit once the changes are applied.
        cursor: Option<SyncCursor>,
    },
    /// The poll was cancelled; nothing was written.
    Cancelled,
}

/// Result of [`SyncEngine::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncReport {
    /// Nothing changed.
    Unchanged,
    /// Changes were applied to the cache.
    Applied {
        /// Number of created items.
        created: usize,
        /// Number of modified items.
        modified: usize,
        /// Number of removed items.
        removed: usize,
    },
    /// The cycle was cancelled; try again later.
    Cancelled,
    /// Another cycle was already running.
    AlreadyRunning,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "up to date"),
            Self::Applied {
                created,
                modified,
                removed,
            } => write!(f, "{created} created, {modified} modified, {removed} removed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::AlreadyRunning => write!(f, "already running"),
        }
    }
}

/// Keeps a [`RevisionStore`] consistent with one remote list.
pub struct SyncEngine<F, S, M>
where
    F: SessionFactory,
    M: DomainMapper,
    S: RevisionStore<M::Payload>,
{
    authorizer: Authorizer<F>,
    coordinator: SaveLoadCoordinator<M::Payload>,
    detector: ChangeDetector,
    store: S,
    mapper: M,
    configured: Option<ListId>,
}

impl<F, S, M> fmt::Debug for SyncEngine<F, S, M>
where
    F: SessionFactory,
    M: DomainMapper,
    S: RevisionStore<M::Payload>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("authorizer", &self.authorizer)
            .field("detector", &self.detector)
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

impl<F, S, M> SyncEngine<F, S, M>
where
    F: SessionFactory,
    M: DomainMapper,
    S: RevisionStore<M::Payload>,
{
    /// Creates a disconnected engine.
    pub fn new(
        config: &SyncConfig,
        factory: F,
        credentials: Arc<dyn CredentialProvider>,
        store: S,
        mapper: M,
    ) -> Self {
        Self {
            authorizer: Authorizer::new(factory, credentials),
            coordinator: SaveLoadCoordinator::new(),
            detector: ChangeDetector::new(config.page_size),
            store,
            mapper,
            configured: config.list(),
        }
    }

    /// The current connection state.
    pub const fn state(&self) -> &ConnectionState {
        self.authorizer.state()
    }

    /// The list the current session is bound to.
    pub fn list(&self) -> Option<&ListId> {
        self.authorizer.session().map(Session::list)
    }

    /// Whether the current session gave up on bounded item queries.
    pub fn degraded_query(&self) -> bool {
        self.authorizer.session().is_some_and(Session::degraded_query)
    }

    /// The revision store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The domain mapper.
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Drops the session and hands back the revision store.
    pub fn into_store(mut self) -> S {
        self.disconnect();
        self.store
    }

    /// Points the engine at another list. Takes effect on the next
    /// [`sync`](Self::sync), or after reconnecting.
    pub fn set_configured_list(&mut self, list: Option<ListId>) {
        self.configured = list;
    }

    /// Whether the configured list no longer matches the bound one.
    pub fn requires_reconnect(&self) -> bool {
        requires_reconnect(self.list(), self.configured.as_ref())
    }

    /// Connects, or reuses the current session.
    ///
    /// Cached items and cursors are dropped when the store holds another
    /// list than the one the session is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Auth`] if connecting fails, or
    /// [`SyncError::Store`] if the store cannot be rebound.
    pub async fn connect(&mut self, cancel: &CancellationToken) -> Result<ConnectionState, SyncError> {
        let state = self.authorizer.connect(self.configured.as_ref(), cancel).await?;
        if let ConnectionState::Connected(list) = &state {
            self.bind_store(list).await?;
        }
        Ok(state)
    }

    async fn bind_store(&self, list: &ListId) -> Result<(), SyncError> {
        let op = Operation::Connect;
        let bound = self
            .store
            .bound_list()
            .await
            .map_err(|e| SyncError::store(op, e))?;
        match bound {
            Some(bound) if &bound == list => return Ok(()),
            Some(bound) => {
                tracing::info!(from = %bound, to = %list, "bound list changed, dropping cached items");
                self.store.clear().await.map_err(|e| SyncError::store(op, e))?;
            }
            // an unbound store is adopted as is
            None => {}
        }
        self.store
            .bind_list(list)
            .await
            .map_err(|e| SyncError::store(op, e))
    }

    /// Drops the session and every pending save result.
    pub fn disconnect(&mut self) {
        self.authorizer.disconnect();
        self.coordinator.clear();
    }

    /// Lists the remote lists visible to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected or the request fails.
    pub async fn list_lists(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ListSummary>, SyncError> {
        let op = Operation::ListLists;
        let session = self.session(op)?;
        session
            .client()
            .query_lists(cancel)
            .await
            .map_err(|e| SyncError::remote(op, session.list(), e))
    }

    /// Asks the remote list what changed since the committed cursor.
    ///
    /// Nothing is written; apply the changes and commit the cursor afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected, or the store or a request fails.
    pub async fn poll(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome<M::Payload>, SyncError> {
        let op = Operation::Poll;
        let session = self
            .authorizer
            .session_mut()
            .ok_or(SyncError::NotConnected(op))?;
        let list = session.list().clone();

        let stored = self
            .store
            .get_cursor(&list)
            .await
            .map_err(|e| SyncError::store(op, e))?;
        let (cursor, version_ok) = match &stored {
            Some((cursor, version)) => {
                if !version.is_current() {
                    tracing::info!(%list, %version, "cursor written by another data version, polling everything");
                }
                (Some(cursor), version.is_current())
            }
            None => (None, true),
        };

        let detection = match self.detector.detect(session, cursor, version_ok, cancel).await {
            Ok(detection) => detection,
            Err(RemoteError::Cancelled) => {
                tracing::info!(%list, "poll cancelled");
                return Ok(PollOutcome::Cancelled);
            }
            Err(e) => return Err(SyncError::remote(op, &list, e)),
        };

        let (items, cursor) = match detection {
            Detection::Unchanged => return Ok(PollOutcome::Unchanged),
            Detection::Changed { items, cursor } => (items, cursor),
        };

        let ids: HashSet<&str> = items
            .iter()
            .map(|a| a.id.as_str())
            .filter(|id| !id.is_empty())
            .collect();
        let mut cached = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self
                .store
                .get_item(id)
                .await
                .map_err(|e| SyncError::store(op, e))?
            {
                cached.insert(id.to_string(), item);
            }
        }

        let changes = classify(&self.mapper, items, |id| cached.remove(id));
        Ok(PollOutcome::Changed { changes, cursor })
    }

    /// Applies a change set to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn apply(&self, changes: &ChangeSet<M::Payload>) -> Result<(), SyncError> {
        self.store
            .apply_changes(changes)
            .await
            .map_err(|e| SyncError::store(Operation::Apply, e))
    }

    /// Stores `cursor` for the bound list.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected or the store fails.
    pub async fn commit(&self, cursor: &SyncCursor) -> Result<(), SyncError> {
        let op = Operation::Apply;
        let list = self.session(op)?.list();
        self.store
            .put_cursor(list, cursor, DataVersion::CURRENT)
            .await
            .map_err(|e| SyncError::store(op, e))?;
        tracing::debug!(%list, %cursor, "committed cursor");
        Ok(())
    }

    /// Runs one full cycle: reconnect if needed, connect, poll, apply, commit.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. Cancellation is reported as
    /// [`SyncReport::Cancelled`].
    pub async fn sync(&mut self, cancel: &CancellationToken) -> Result<SyncReport, SyncError> {
        if self.requires_reconnect() {
            tracing::info!(configured = ?self.configured, "configured list changed, reconnecting");
            self.disconnect();
        }

        match self.connect(cancel).await {
            Ok(_) => {}
            Err(SyncError::Auth(AuthError::Cancelled)) => return Ok(SyncReport::Cancelled),
            Err(e) => return Err(e),
        }

        let (changes, cursor) = match self.poll(cancel).await? {
            PollOutcome::Unchanged => return Ok(SyncReport::Unchanged),
            PollOutcome::Cancelled => return Ok(SyncReport::Cancelled),
            PollOutcome::Changed { changes, cursor } => (changes, cursor),
        };
        if cancel.is_cancelled() {
            return Ok(SyncReport::Cancelled);
        }

        self.apply(&changes).await?;
        if let Some(cursor) = &cursor {
            self.commit(cursor).await?;
        }

        let report = SyncReport::Applied {
            created: changes.created.len(),
            modified: changes.modified.len(),
            removed: changes.removed.len(),
        };
        tracing::info!(list = ?self.list(), %report, "sync finished");
        Ok(report)
    }

    /// Writes `payload` to the remote list.
    ///
    /// Updates are based on the cached version of the item. The result is
    /// handed out once by [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns an error if not connected, the payload has no id for an
    /// update, or the request fails.
    pub async fn save(
        &mut self,
        payload: &M::Payload,
        is_update: bool,
        cancel: &CancellationToken,
    ) -> Result<AuthoritativeItem<M::Payload>, SyncError> {
        let op = Operation::Save;
        let session = self
            .authorizer
            .session()
            .ok_or(SyncError::NotConnected(op))?;

        let previous = if is_update {
            let id = self.mapper.uid(payload).ok_or_else(|| {
                SyncError::InvalidPayload("an update requires an item id".to_string())
            })?;
            self.store
                .get_item(&id)
                .await
                .map_err(|e| SyncError::store(op, e))?
                .map(|a| a.payload)
        } else {
            None
        };

        self.coordinator
            .save(
                session.client(),
                session.list(),
                &self.mapper,
                payload,
                previous.as_ref(),
                is_update,
                cancel,
            )
            .await
    }

    /// Loads the result of an earlier save into the store.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if there is no pending result for
    /// `id`, or an error if the store fails.
    pub async fn load(&mut self, id: &str) -> Result<AuthoritativeItem<M::Payload>, SyncError> {
        let item = self.coordinator.load(id)?;
        self.store
            .put_item(&item)
            .await
            .map_err(|e| SyncError::store(Operation::Load, e))?;
        Ok(item)
    }

    /// Deletes a cached item from the remote list, then from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected, the item is not cached, or the
    /// request fails.
    pub async fn remove(&mut self, id: &str, cancel: &CancellationToken) -> Result<(), SyncError> {
        let op = Operation::Remove;
        let session = self
            .authorizer
            .session()
            .ok_or(SyncError::NotConnected(op))?;

        let cached = self
            .store
            .get_item(id)
            .await
            .map_err(|e| SyncError::store(op, e))?
            .ok_or_else(|| SyncError::NotFound { id: id.to_string() })?;

        self.coordinator
            .remove(session.client(), session.list(), &self.mapper, &cached, cancel)
            .await?;

        self.store
            .remove_item(id)
            .await
            .map_err(|e| SyncError::store(op, e))
    }

    /// Creates an item and loads the server's version of it.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save) and [`load`](Self::load).
    pub async fn create_item(
        &mut self,
        payload: &M::Payload,
        cancel: &CancellationToken,
    ) -> Result<AuthoritativeItem<M::Payload>, SyncError> {
        let item = self.save(payload, false, cancel).await?;
        self.load(&item.id).await
    }

    /// Updates an item and loads the server's version of it.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save) and [`load`](Self::load).
    pub async fn modify_item(
        &mut self,
        payload: &M::Payload,
        cancel: &CancellationToken,
    ) -> Result<AuthoritativeItem<M::Payload>, SyncError> {
        let item = self.save(payload, true, cancel).await?;
        self.load(&item.id).await
    }

    /// Looks up a cached item.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn cached(&self, id: &str) -> Result<Option<CachedItem<M::Payload>>, SyncError> {
        self.store
            .get_item(id)
            .await
            .map_err(|e| SyncError::store(Operation::Load, e))
    }

    fn session(&self, op: Operation) -> Result<&Session<F::Client>, SyncError> {
        self.authorizer.session().ok_or(SyncError::NotConnected(op))
    }
}

/// A [`SyncEngine`] shared between tasks.
///
/// Operations on the list are serialized, and a sync requested while another
/// one is running returns [`SyncReport::AlreadyRunning`] at once.
pub struct SharedEngine<F, S, M>
where
    F: SessionFactory,
    M: DomainMapper,
    S: RevisionStore<M::Payload>,
{
    engine: Arc<Mutex<SyncEngine<F, S, M>>>,
    syncing: Arc<AtomicBool>,
}

impl<F, S, M> Clone for SharedEngine<F, S, M>
where
    F: SessionFactory,
    M: DomainMapper,
    S: RevisionStore<M::Payload>,
{
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            syncing: self.syncing.clone(),
        }
    }
}

impl<F, S, M> fmt::Debug for SharedEngine<F, S, M>
where
    F: SessionFactory,
    M: DomainMapper,
    S: RevisionStore<M::Payload>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEngine")
            .field("syncing", &self.syncing.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<F, S, M> SharedEngine<F, S, M>
where
    F: SessionFactory,
    M: DomainMapper,
    S: RevisionStore<M::Payload>,
{
    /// Wraps an engine.
    pub fn new(engine: SyncEngine<F, S, M>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            syncing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs a sync cycle unless one is already in flight.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::sync`].
    pub async fn sync(&self, cancel: &CancellationToken) -> Result<SyncReport, SyncError> {
        if self.syncing.swap(true, Ordering::AcqRel) {
            tracing::debug!("sync already in flight, skipping");
            return Ok(SyncReport::AlreadyRunning);
        }

        let _guard = InFlight(&self.syncing);
        self.engine.lock().await.sync(cancel).await
    }

    /// Locks the engine for any other operation.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, SyncEngine<F, S, M>> {
        self.engine.lock().await
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
