// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Single-item writes outside of the polling cycle.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::error::{ErrorKind, Operation, RemoteError, SyncError};
use crate::mapper::DomainMapper;
use crate::remote::RemoteListClient;
use crate::types::{AuthoritativeItem, CachedItem, ListId, RemoteItem};

/// Hands the server's post-write state of an item to the next load of it.
///
/// Every successful save leaves its result in a one-shot side-table, which
/// [`load`](Self::load) consumes.
#[derive(Debug)]
pub struct SaveLoadCoordinator<P> {
    preload: HashMap<String, CachedItem<P>>,
}

impl<P> Default for SaveLoadCoordinator<P> {
    fn default() -> Self {
        Self {
            preload: HashMap::new(),
        }
    }
}

impl<P: Clone> SaveLoadCoordinator<P> {
    /// Creates a coordinator with an empty side-table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `payload` to the remote list and returns the server's version.
    ///
    /// For updates, `previous` is the cached payload the edit is based on.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be mapped or the request fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn save<C, M>(
        &mut self,
        client: &C,
        list: &ListId,
        mapper: &M,
        payload: &P,
        previous: Option<&P>,
        is_update: bool,
        cancel: &CancellationToken,
    ) -> Result<AuthoritativeItem<P>, SyncError>
    where
        C: RemoteListClient + ?Sized,
        M: DomainMapper<Payload = P> + ?Sized,
    {
        let op = Operation::Save;
        let remote = mapper
            .to_remote(payload, previous, is_update)
            .map_err(|e| mapping_error(op, list, e))?;

        let response = if is_update {
            let Some(id) = remote.id.as_deref() else {
                return Err(SyncError::InvalidPayload(
                    "an update requires the remote id".to_string(),
                ));
            };

            let updated = client
                .update_item(list, &remote, cancel)
                .await
                .map_err(|e| SyncError::remote(op, list, e))?;

            if updated.parent == remote.parent {
                updated
            } else {
                tracing::debug!(id, parent = ?remote.parent, "moving item to new parent");
                client
                    .move_item(list, id, remote.parent.as_deref(), cancel)
                    .await
                    .map_err(|e| SyncError::remote(op, list, e))?
            }
        } else {
            client
                .insert_item(list, &remote, cancel)
                .await
                .map_err(|e| SyncError::remote(op, list, e))?
        };

        let item = Self::authoritative(mapper, list, &response, previous)?;
        tracing::debug!(id = %item.id, update = is_update, "saved item");
        self.preload.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    /// Consumes the result of an earlier save.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if no save left an entry for `id`, or it
    /// was already loaded.
    pub fn load(&mut self, id: &str) -> Result<AuthoritativeItem<P>, SyncError> {
        self.preload.remove(id).ok_or_else(|| SyncError::NotFound {
            id: id.to_string(),
        })
    }

    /// Deletes `cached` from the remote list.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be mapped or the request fails.
    pub async fn remove<C, M>(
        &mut self,
        client: &C,
        list: &ListId,
        mapper: &M,
        cached: &CachedItem<P>,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError>
    where
        C: RemoteListClient + ?Sized,
        M: DomainMapper<Payload = P> + ?Sized,
    {
        let op = Operation::Remove;
        let mut remote = mapper
            .to_remote(&cached.payload, None, true)
            .map_err(|e| mapping_error(op, list, e))?;
        if remote.id.is_none() {
            remote.id = Some(cached.id.clone());
        }

        match client.delete_item(list, &remote, cancel).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::ProtocolQuirkSuccess => {
                tracing::debug!(id = %cached.id, reason = %e, "delete reported an error but succeeded");
            }
            Err(e) => return Err(SyncError::remote(op, list, e)),
        }

        self.preload.remove(&cached.id);
        tracing::debug!(id = %cached.id, "removed item");
        Ok(())
    }

    /// Drops every pending entry.
    pub fn clear(&mut self) {
        self.preload.clear();
    }

    /// Number of pending entries.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.preload.len()
    }

    fn authoritative<M>(
        mapper: &M,
        list: &ListId,
        response: &RemoteItem,
        previous: Option<&P>,
    ) -> Result<AuthoritativeItem<P>, SyncError>
    where
        M: DomainMapper<Payload = P> + ?Sized,
    {
        let mut payload = mapper
            .from_remote(response)
            .map_err(|e| mapping_error(Operation::Save, list, e))?;
        if let Some(previous) = previous {
            mapper.carry_forward(&mut payload, previous);
        }

        Ok(CachedItem {
            id: response.id.clone(),
            revision: mapper.revision(&payload),
            payload,
        })
    }
}

fn mapping_error(op: Operation, list: &ListId, e: RemoteError) -> SyncError {
    match e {
        RemoteError::InvalidPayload(msg) => SyncError::InvalidPayload(msg),
        e => SyncError::remote(op, list, e),
    }
}
