use crate::models::{EventQuery, EventRecord};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record is missing its {0}")]
    MissingKey(&'static str),
    #[error("invalid table name '{0}'")]
    InvalidTable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Read access to the tracking-event table.
///
/// Records are keyed by `(event_id, operation)`: the event id is the
/// partition key and the operation the sort key.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn init(&self) -> Result<()>;

    /// Get a single record by its full key
    async fn get(&self, event_id: &str, operation: &str) -> Result<Option<EventRecord>>;

    /// List every record in the table
    async fn list_all(&self) -> Result<Vec<EventRecord>>;

    /// List all records of one event
    async fn list_by_event_id(&self, event_id: &str) -> Result<Vec<EventRecord>>;

    /// List records with the given operation across all events.
    /// The operation is not a partition key, so this scans the table.
    async fn list_by_operation(&self, operation: &str) -> Result<Vec<EventRecord>>;

    /// List records matching both key parts
    async fn list_by_event_id_and_operation(
        &self,
        event_id: &str,
        operation: &str,
    ) -> Result<Vec<EventRecord>>;

    /// Insert or replace records. Used by the import tool to seed a table;
    /// the dashboard itself never writes.
    async fn upsert_batch(&self, records: &[EventRecord]) -> StorageResult<u64>;

    /// Dispatch an [`EventQuery`] to the matching lookup
    async fn fetch(&self, query: &EventQuery) -> Result<Vec<EventRecord>> {
        match query {
            EventQuery::All => self.list_all().await,
            EventQuery::ByEventId(event_id) => self.list_by_event_id(event_id).await,
            EventQuery::ByOperation(operation) => self.list_by_operation(operation).await,
            EventQuery::ByEventIdAndOperation {
                event_id,
                operation,
            } => {
                self.list_by_event_id_and_operation(event_id, operation)
                    .await
            }
        }
    }
}

/// Split a record into its key parts and JSON payload for storage.
pub(crate) fn storage_row(record: &EventRecord) -> StorageResult<(&str, &str, Option<String>)> {
    let event_id = record
        .event_id
        .as_deref()
        .ok_or(StorageError::MissingKey("eventId"))?;
    let operation = record
        .operation
        .as_deref()
        .ok_or(StorageError::MissingKey("operation"))?;
    let data = record
        .data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StorageError::Other(e.into()))?;

    Ok((event_id, operation, data))
}

/// Rebuild a record from a stored row. An unreadable payload is logged and
/// dropped rather than failing the whole listing.
pub(crate) fn record_from_row(
    event_id: String,
    operation: String,
    data: Option<String>,
) -> EventRecord {
    let data = data.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(
                "Unreadable data payload for {}/{}: {}",
                event_id,
                operation,
                e
            );
            None
        }
    });

    EventRecord {
        event_id: Some(event_id),
        operation: Some(operation),
        data,
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub(crate) fn validate_table_name(table: &str) -> StorageResult<()> {
    let valid = !table.is_empty()
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidTable(table.to_string()))
    }
}
