// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! SQLite backed [`RevisionStore`].

mod cursors;
mod items;

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::localdb::cursors::Cursors;
use crate::localdb::items::{ItemRecord, Items};
use crate::store::RevisionStore;
use crate::types::{CachedItem, ChangeSet, DataVersion, ListId, Revision, SyncCursor};

/// A [`RevisionStore`] persisted in a SQLite database.
///
/// Payloads are stored as JSON text.
pub struct SqliteStore<P> {
    pool: SqlitePool,
    items: Items,
    cursors: Cursors,
    _payload: PhantomData<fn() -> P>,
}

impl<P> fmt::Debug for SqliteStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl<P> SqliteStore<P>
where
    P: Serialize + DeserializeOwned,
{
    /// Opens a sqlite database.
    /// If `filename` is `None`, it opens an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn open(filename: Option<&Path>) -> Result<Self, StoreError> {
        let (options, pool_options) = if let Some(filename) = filename {
            tracing::info!(path = %filename.display(), "connecting to SQLite database");
            let options = SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true);
            (options, SqlitePoolOptions::new())
        } else {
            // every in-memory connection is its own database, keep exactly one alive
            tracing::info!("connecting to in-memory SQLite database");
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (SqliteConnectOptions::new().in_memory(true), pool_options)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("src/localdb/migrations") // relative path from the crate root
            .run(&pool)
            .await?;

        tracing::debug!("revision store ready");
        Ok(Self {
            items: Items::new(pool.clone()),
            cursors: Cursors::new(pool.clone()),
            pool,
            _payload: PhantomData,
        })
    }

    /// Returns all cached items ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails.
    pub async fn list_items(&self) -> Result<Vec<CachedItem<P>>, StoreError> {
        self.items
            .list()
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Number of cached items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_items(&self) -> Result<i64, StoreError> {
        Ok(self.items.count().await?)
    }

    /// Closes the database connection.
    pub async fn close(self) {
        tracing::debug!("closing database connection");
        self.pool.close().await;
    }

    fn encode(item: &CachedItem<P>) -> Result<ItemRecord, StoreError> {
        Ok(ItemRecord {
            uid: item.id.clone(),
            revision: item.revision.as_ref().map(|r| r.as_str().to_string()),
            payload: serde_json::to_string(&item.payload)?,
        })
    }

    fn decode(record: ItemRecord) -> Result<CachedItem<P>, StoreError> {
        Ok(CachedItem {
            payload: serde_json::from_str(&record.payload)?,
            id: record.uid,
            revision: record.revision.map(Revision::new),
        })
    }
}

#[async_trait]
impl<P> RevisionStore<P> for SqliteStore<P>
where
    P: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn get_cursor(
        &self,
        list: &ListId,
    ) -> Result<Option<(SyncCursor, DataVersion)>, StoreError> {
        let row = self.cursors.get(list.as_str()).await?;
        Ok(row.map(|(cursor, version)| {
            // an out of range version never matches, which forces a full poll
            let version = u32::try_from(version).unwrap_or_default();
            (SyncCursor::new(cursor), DataVersion(version))
        }))
    }

    async fn put_cursor(
        &self,
        list: &ListId,
        cursor: &SyncCursor,
        version: DataVersion,
    ) -> Result<(), StoreError> {
        self.cursors
            .upsert(list.as_str(), cursor.as_str(), i64::from(version.0))
            .await?;
        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<CachedItem<P>>, StoreError> {
        self.items.get(id).await?.map(Self::decode).transpose()
    }

    async fn put_item(&self, item: &CachedItem<P>) -> Result<(), StoreError> {
        let record = Self::encode(item)?;
        Items::upsert(&self.pool, &record).await?;
        Ok(())
    }

    async fn remove_item(&self, id: &str) -> Result<(), StoreError> {
        Items::delete(&self.pool, id).await?;
        Ok(())
    }

    async fn bound_list(&self) -> Result<Option<ListId>, StoreError> {
        Ok(self.cursors.bound_list().await?.map(ListId::from))
    }

    async fn bind_list(&self, list: &ListId) -> Result<(), StoreError> {
        self.cursors.bind_list(list.as_str()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Items::delete_all(&mut *tx).await?;
        Cursors::delete_all(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn apply_changes(&self, changes: &ChangeSet<P>) -> Result<(), StoreError> {
        let records = changes
            .created
            .iter()
            .chain(&changes.modified)
            .map(Self::encode)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        for record in &records {
            Items::upsert(&mut *tx, record).await?;
        }
        for id in &changes.removed {
            Items::delete(&mut *tx, id).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            upserted = records.len(),
            removed = changes.removed.len(),
            "applied change set"
        );
        Ok(())
    }
}
