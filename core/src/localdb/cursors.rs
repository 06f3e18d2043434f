// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::{Sqlite, SqliteExecutor, SqlitePool};

#[derive(Debug, Clone)]
pub struct Cursors {
    pool: SqlitePool,
}

impl Cursors {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(
        &self,
        list_id: &str,
        cursor: &str,
        data_version: i64,
    ) -> Result<(), sqlx::Error> {
        const SQL: &str = "\
INSERT INTO cursors (list_id, cursor, data_version)
VALUES (?, ?, ?)
ON CONFLICT(list_id) DO UPDATE SET
    cursor       = excluded.cursor,
    data_version = excluded.data_version;
";

        sqlx::query(SQL)
            .bind(list_id)
            .bind(cursor)
            .bind(data_version)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get(&self, list_id: &str) -> Result<Option<(String, i64)>, sqlx::Error> {
        const SQL: &str = "SELECT cursor, data_version FROM cursors WHERE list_id = ?;";

        sqlx::query_as(SQL)
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query::<Sqlite>("DELETE FROM cursors;")
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn bound_list(&self) -> Result<Option<String>, sqlx::Error> {
        const SQL: &str = "SELECT list_id FROM binding WHERE id = 0;";

        let row: Option<(String,)> = sqlx::query_as(SQL).fetch_optional(&self.pool).await?;
        Ok(row.map(|a| a.0))
    }

    pub async fn bind_list(&self, list_id: &str) -> Result<(), sqlx::Error> {
        const SQL: &str = "\
INSERT INTO binding (id, list_id)
VALUES (0, ?)
ON CONFLICT(id) DO UPDATE SET
    list_id = excluded.list_id;
";

        sqlx::query(SQL).bind(list_id).execute(&self.pool).await?;
        Ok(())
    }
}
