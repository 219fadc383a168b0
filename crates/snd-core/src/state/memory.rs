// # Memory History Store
//
// In-memory implementation of HistoryStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across runs.
// Useful for testing and for dry runs against the live provider.
//
// ## Crash Behavior
//
// - All history is lost when the process exits
// - The next run starts with no tracked entities

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::ledger::Ledger;
use crate::Error;
use crate::traits::history_store::{EntityHandle, HistoryStore, NameRecord, RankRecord};

/// In-memory history store implementation
///
/// Clones share the same underlying ledger, so a test can hand one clone to
/// the engine and inspect the history through another.
///
/// # Example
///
/// ```rust,no_run
/// use snd_core::state::MemoryHistoryStore;
/// use snd_core::traits::HistoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryHistoryStore::new();
///
///     let handle = store.create_entity("12345").await?;
///     store.append_name(&handle, "Faker", chrono::Utc::now()).await?;
///
///     let latest = store.latest_name(&handle).await?;
///     assert_eq!(latest.map(|n| n.value), Some("Faker".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    inner: Arc<RwLock<Ledger>>,
}

impl MemoryHistoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of tracked entities
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store tracks no entities
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.len() == 0
    }

    /// Full rank history of an entity, oldest first
    pub async fn rank_history(&self, handle: &EntityHandle) -> Result<Vec<RankRecord>, Error> {
        self.inner.read().await.rank_history(handle)
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn create_entity(&self, external_id: &str) -> Result<EntityHandle, Error> {
        let mut guard = self.inner.write().await;
        guard.create(external_id)
    }

    async fn append_name(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.append_name(handle, value, observed_at)
    }

    async fn append_rank(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.append_rank(handle, value, observed_at)
    }

    async fn all_entities(&self) -> Result<Vec<EntityHandle>, Error> {
        Ok(self.inner.read().await.handles())
    }

    async fn find_entity(&self, external_id: &str) -> Result<Option<EntityHandle>, Error> {
        Ok(self.inner.read().await.find(external_id))
    }

    async fn latest_name(&self, handle: &EntityHandle) -> Result<Option<NameRecord>, Error> {
        self.inner.read().await.latest_name(handle)
    }

    async fn latest_rank(&self, handle: &EntityHandle) -> Result<Option<RankRecord>, Error> {
        self.inner.read().await.latest_rank(handle)
    }

    async fn name_history(&self, handle: &EntityHandle) -> Result<Vec<NameRecord>, Error> {
        self.inner.read().await.name_history(handle)
    }

    async fn names_matching(
        &self,
        pattern: &Regex,
    ) -> Result<Vec<(EntityHandle, NameRecord)>, Error> {
        Ok(self.inner.read().await.names_matching(pattern))
    }

    async fn flush(&self) -> Result<(), Error> {
        // No-op for memory store (everything is already "persisted")
        Ok(())
    }
}
