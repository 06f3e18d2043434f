// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Durable cache of items and sync cursors.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::types::{CachedItem, ChangeSet, DataVersion, ListId, SyncCursor};

/// Key-value store holding one sync cursor per list and one cached item per id.
#[async_trait]
pub trait RevisionStore<P>: Send + Sync
where
    P: Clone + Send + Sync + 'static,
{
    /// Reads the cursor of a list together with the version it was written under.
    async fn get_cursor(&self, list: &ListId)
    -> Result<Option<(SyncCursor, DataVersion)>, StoreError>;

    /// Writes the cursor of a list.
    async fn put_cursor(
        &self,
        list: &ListId,
        cursor: &SyncCursor,
        version: DataVersion,
    ) -> Result<(), StoreError>;

    /// Reads a cached item.
    async fn get_item(&self, id: &str) -> Result<Option<CachedItem<P>>, StoreError>;

    /// Whether an item is cached.
    async fn has_item(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.get_item(id).await?.is_some())
    }

    /// Inserts or replaces a cached item.
    async fn put_item(&self, item: &CachedItem<P>) -> Result<(), StoreError>;

    /// Removes a cached item. Removing an absent id is a no-op.
    async fn remove_item(&self, id: &str) -> Result<(), StoreError>;

    /// The list the cached items belong to, if any was recorded.
    async fn bound_list(&self) -> Result<Option<ListId>, StoreError>;

    /// Records the list the cached items belong to.
    async fn bind_list(&self, list: &ListId) -> Result<(), StoreError>;

    /// Drops every cached item and cursor. The bound list is kept.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Marks the start of a bulk apply.
    async fn begin_batch(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Marks the end of a bulk apply.
    async fn end_batch(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Applies a whole change set.
    async fn apply_changes(&self, changes: &ChangeSet<P>) -> Result<(), StoreError> {
        self.begin_batch().await?;
        let res = async {
            for item in changes.created.iter().chain(&changes.modified) {
                self.put_item(item).await?;
            }
            for id in &changes.removed {
                self.remove_item(id).await?;
            }
            Ok(())
        }
        .await;
        self.end_batch().await?;
        res
    }
}

/// In-memory [`RevisionStore`].
#[derive(Debug)]
pub struct MemoryStore<P> {
    cursors: Mutex<HashMap<ListId, (SyncCursor, DataVersion)>>,
    items: Mutex<HashMap<String, CachedItem<P>>>,
    bound: Mutex<Option<ListId>>,
}

impl<P> Default for MemoryStore<P> {
    fn default() -> Self {
        Self {
            cursors: Mutex::new(HashMap::new()),
            items: Mutex::new(HashMap::new()),
            bound: Mutex::new(None),
        }
    }
}

impl<P: Clone> MemoryStore<P> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all cached items, in no particular order.
    pub async fn items(&self) -> Vec<CachedItem<P>> {
        self.items.lock().await.values().cloned().collect()
    }

    /// Number of cached items.
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Whether the store holds no items.
    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl<P> RevisionStore<P> for MemoryStore<P>
where
    P: Clone + Send + Sync + 'static,
{
    async fn get_cursor(
        &self,
        list: &ListId,
    ) -> Result<Option<(SyncCursor, DataVersion)>, StoreError> {
        Ok(self.cursors.lock().await.get(list).cloned())
    }

    async fn put_cursor(
        &self,
        list: &ListId,
        cursor: &SyncCursor,
        version: DataVersion,
    ) -> Result<(), StoreError> {
        self.cursors
            .lock()
            .await
            .insert(list.clone(), (cursor.clone(), version));
        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<CachedItem<P>>, StoreError> {
        Ok(self.items.lock().await.get(id).cloned())
    }

    async fn put_item(&self, item: &CachedItem<P>) -> Result<(), StoreError> {
        self.items
            .lock()
            .await
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn remove_item(&self, id: &str) -> Result<(), StoreError> {
        self.items.lock().await.remove(id);
        Ok(())
    }

    async fn bound_list(&self) -> Result<Option<ListId>, StoreError> {
        Ok(self.bound.lock().await.clone())
    }

    async fn bind_list(&self, list: &ListId) -> Result<(), StoreError> {
        *self.bound.lock().await = Some(list.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.items.lock().await.clear();
        self.cursors.lock().await.clear();
        Ok(())
    }
}
