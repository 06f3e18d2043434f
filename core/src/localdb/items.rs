// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::{Sqlite, SqliteExecutor, SqlitePool};

#[derive(Debug, Clone)]
pub struct Items {
    pool: SqlitePool,
}

impl Items {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert<'e, E>(executor: E, item: &ItemRecord) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        const SQL: &str = "\
INSERT INTO items (uid, revision, payload)
VALUES (?, ?, ?)
ON CONFLICT(uid) DO UPDATE SET
    revision = excluded.revision,
    payload  = excluded.payload;
";

        sqlx::query::<Sqlite>(SQL)
            .bind(&item.uid)
            .bind(&item.revision)
            .bind(&item.payload)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn delete<'e, E>(executor: E, uid: &str) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        const SQL: &str = "DELETE FROM items WHERE uid = ?;";

        sqlx::query::<Sqlite>(SQL)
            .bind(uid)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query::<Sqlite>("DELETE FROM items;")
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn get(&self, uid: &str) -> Result<Option<ItemRecord>, sqlx::Error> {
        const SQL: &str = "SELECT uid, revision, payload FROM items WHERE uid = ?;";

        sqlx::query_as(SQL)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(&self) -> Result<Vec<ItemRecord>, sqlx::Error> {
        const SQL: &str = "SELECT uid, revision, payload FROM items ORDER BY uid;";

        sqlx::query_as(SQL).fetch_all(&self.pool).await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items;")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRecord {
    pub uid: String,
    pub revision: Option<String>,
    pub payload: String,
}
