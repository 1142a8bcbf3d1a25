use crate::models::EventRecord;
use crate::storage::trait_def::{record_from_row, storage_row, validate_table_name};
use crate::storage::{EventStore, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

type Row = (String, String, Option<String>);

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    table: String,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, table: &str, max_connections: u32) -> Result<Self> {
        validate_table_name(table)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
            table: table.to_string(),
        })
    }

    async fn fetch_rows(&self, sql: &str, binds: &[&str]) -> Result<Vec<EventRecord>> {
        let mut query = sqlx::query_as::<_, Row>(sql);
        for value in binds {
            query = query.bind(*value);
        }

        let records = query
            .fetch_all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|(event_id, operation, data)| record_from_row(event_id, operation, data))
            .collect();

        Ok(records)
    }
}

#[async_trait]
impl EventStore for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                event_id TEXT NOT NULL,
                operation TEXT NOT NULL,
                data TEXT,
                PRIMARY KEY (event_id, operation)
            )
            "#,
            table = self.table
        ))
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_operation ON {table}(operation)",
            table = self.table
        ))
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn get(&self, event_id: &str, operation: &str) -> Result<Option<EventRecord>> {
        let row = sqlx::query_as::<_, Row>(&format!(
            "SELECT event_id, operation, data FROM {} WHERE event_id = ? AND operation = ?",
            self.table
        ))
        .bind(event_id)
        .bind(operation)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|(event_id, operation, data)| record_from_row(event_id, operation, data)))
    }

    async fn list_all(&self) -> Result<Vec<EventRecord>> {
        let sql = format!(
            "SELECT event_id, operation, data FROM {} ORDER BY event_id, operation",
            self.table
        );
        self.fetch_rows(&sql, &[]).await
    }

    async fn list_by_event_id(&self, event_id: &str) -> Result<Vec<EventRecord>> {
        let sql = format!(
            "SELECT event_id, operation, data FROM {} WHERE event_id = ? ORDER BY operation",
            self.table
        );
        self.fetch_rows(&sql, &[event_id]).await
    }

    async fn list_by_operation(&self, operation: &str) -> Result<Vec<EventRecord>> {
        let sql = format!(
            "SELECT event_id, operation, data FROM {} WHERE operation = ? ORDER BY event_id",
            self.table
        );
        self.fetch_rows(&sql, &[operation]).await
    }

    async fn list_by_event_id_and_operation(
        &self,
        event_id: &str,
        operation: &str,
    ) -> Result<Vec<EventRecord>> {
        let sql = format!(
            "SELECT event_id, operation, data FROM {} WHERE event_id = ? AND operation = ?",
            self.table
        );
        self.fetch_rows(&sql, &[event_id, operation]).await
    }

    async fn upsert_batch(&self, records: &[EventRecord]) -> StorageResult<u64> {
        let sql = format!(
            r#"
            INSERT INTO {} (event_id, operation, data)
            VALUES (?, ?, ?)
            ON CONFLICT (event_id, operation) DO UPDATE SET data = excluded.data
            "#,
            self.table
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        let mut written = 0;
        for record in records {
            let (event_id, operation, data) = storage_row(record)?;
            let result = sqlx::query(&sql)
                .bind(event_id)
                .bind(operation)
                .bind(data)
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Other(e.into()))?;
            written += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        Ok(written)
    }
}
