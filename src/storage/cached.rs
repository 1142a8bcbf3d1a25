use crate::models::{EventQuery, EventRecord};
use crate::storage::{EventStore, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache over another store.
///
/// Listings are cached per [`EventQuery`] for a short TTL so that flipping
/// between stats views over the same query does not hit the table again.
/// Failed lookups are never cached, and neither is a listing whose fetch
/// overlapped an invalidation.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn EventStore>,
    /// Listing cache keyed by query (Moka cache)
    listings: Cache<EventQuery, Arc<Vec<EventRecord>>>,
    /// Bumped on every invalidation
    generation: AtomicU64,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn EventStore>, max_cache_entries: u64, ttl_secs: u64) -> Self {
        let listings = Cache::builder()
            .max_capacity(max_cache_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            inner,
            listings,
            generation: AtomicU64::new(0),
        }
    }

    async fn cached(&self, query: EventQuery) -> Result<Vec<EventRecord>> {
        if let Some(hit) = self.listings.get(&query).await {
            tracing::debug!("Query cache hit for {:?}", query);
            return Ok(hit.as_ref().clone());
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let records = self.inner.fetch(&query).await?;
        self.listings
            .insert(query.clone(), Arc::new(records.clone()))
            .await;

        // A write landed while this listing was in flight; it may predate it
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding listing for {:?} raced by a write", query);
            self.listings.invalidate(&query).await;
        }

        Ok(records)
    }

    /// Drop every cached listing
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.listings.invalidate_all();
    }
}

#[async_trait]
impl EventStore for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn get(&self, event_id: &str, operation: &str) -> Result<Option<EventRecord>> {
        let records = self
            .cached(EventQuery::ByEventIdAndOperation {
                event_id: event_id.to_string(),
                operation: operation.to_string(),
            })
            .await?;
        Ok(records.into_iter().next())
    }

    async fn list_all(&self) -> Result<Vec<EventRecord>> {
        self.cached(EventQuery::All).await
    }

    async fn list_by_event_id(&self, event_id: &str) -> Result<Vec<EventRecord>> {
        self.cached(EventQuery::ByEventId(event_id.to_string()))
            .await
    }

    async fn list_by_operation(&self, operation: &str) -> Result<Vec<EventRecord>> {
        self.cached(EventQuery::ByOperation(operation.to_string()))
            .await
    }

    async fn list_by_event_id_and_operation(
        &self,
        event_id: &str,
        operation: &str,
    ) -> Result<Vec<EventRecord>> {
        self.cached(EventQuery::ByEventIdAndOperation {
            event_id: event_id.to_string(),
            operation: operation.to_string(),
        })
        .await
    }

    async fn upsert_batch(&self, records: &[EventRecord]) -> StorageResult<u64> {
        let written = self.inner.upsert_batch(records).await?;
        self.invalidate();
        Ok(written)
    }
}
