pub mod cached;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use cached::CachedStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{EventStore, StorageError, StorageResult};

use crate::config::{Config, DatabaseBackend};
use std::sync::Arc;

/// Open the configured backend, wrapped in the query cache unless disabled.
pub async fn open(config: &Config) -> anyhow::Result<Arc<dyn EventStore>> {
    let db = &config.database;
    let store: Arc<dyn EventStore> = match db.backend {
        DatabaseBackend::Sqlite => {
            tracing::info!("Using SQLite storage: {} (table {})", db.url, db.table);
            Arc::new(SqliteStorage::new(&db.url, &db.table, db.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL storage: {} (table {})", db.url, db.table);
            Arc::new(PostgresStorage::new(&db.url, &db.table, db.max_connections).await?)
        }
    };

    if config.cache.ttl_secs == 0 {
        tracing::info!("Query cache disabled");
        return Ok(store);
    }

    Ok(Arc::new(CachedStorage::new(
        store,
        config.cache.max_entries,
        config.cache.ttl_secs,
    )))
}
