// # History Store Trait
//
// Defines the interface for the append-only account history.
//
// ## Purpose
//
// The store keeps, per tracked account (entity):
// - The provider-assigned external id (unique, immutable)
// - Every display name ever observed, with the time it was observed
// - Every rank peak ever observed, with the time it was observed
//
// Entities are created once and never deleted; their histories only grow.
//
// ## Implementations
//
// - File-based: one JSON file per region
// - Memory: tests and dry runs
//
// ## Usage
//
// ```rust,ignore
// use snd_core::HistoryStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* HistoryStore implementation */;
//
//     let handle = store.create_entity("12345").await?;
//     store.append_name(&handle, "Faker", chrono::Utc::now()).await?;
//
//     let name = store.latest_name(&handle).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal surrogate id of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a tracked entity, handed out by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    /// Surrogate id
    pub id: EntityId,
    /// Provider-assigned account id
    pub external_id: String,
}

/// One observed display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub value: String,
    pub observed_at: DateTime<Utc>,
}

/// One observed rank peak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRecord {
    /// Rank descriptor, e.g. `"GOLD III 42LP"` or `"UNRANKED"`
    pub value: String,
    pub observed_at: DateTime<Utc>,
}

/// Trait for history store implementations
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage
/// - ✅ Cache state in memory (with explicit flush)
///
/// ## Forbidden Capabilities
/// - ❌ Edit or remove history records (append-only)
/// - ❌ Decide whether a value is a change (owned by the detector)
/// - ❌ Talk to the provider (owned by `HistoryEngine`)
///
/// Writes are strictly sequential within one process; implementations do
/// not need to coordinate with other processes.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Start tracking an account
    ///
    /// # Returns
    ///
    /// - `Ok(EntityHandle)`: The new entity, with empty histories
    /// - `Err(Error::DuplicateEntity)`: The external id is already tracked
    async fn create_entity(&self, external_id: &str) -> Result<EntityHandle, crate::Error>;

    /// Append a name record to an entity's history
    ///
    /// Fails with `Error::NotFound` for an unknown handle.
    async fn append_name(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), crate::Error>;

    /// Append a rank record to an entity's history
    ///
    /// Fails with `Error::NotFound` for an unknown handle.
    async fn append_rank(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), crate::Error>;

    /// All tracked entities, in creation order
    async fn all_entities(&self) -> Result<Vec<EntityHandle>, crate::Error>;

    /// Look up an entity by its external id
    async fn find_entity(&self, external_id: &str) -> Result<Option<EntityHandle>, crate::Error>;

    /// The most recent name record, if any
    async fn latest_name(&self, handle: &EntityHandle) -> Result<Option<NameRecord>, crate::Error>;

    /// The most recent rank record (the current peak), if any
    async fn latest_rank(&self, handle: &EntityHandle) -> Result<Option<RankRecord>, crate::Error>;

    /// Full name history, oldest first
    async fn name_history(&self, handle: &EntityHandle) -> Result<Vec<NameRecord>, crate::Error>;

    /// Every historical name record matching `pattern`, with its owner
    ///
    /// Results are ordered by entity, then by record age (oldest first).
    async fn names_matching(
        &self,
        pattern: &Regex,
    ) -> Result<Vec<(EntityHandle, NameRecord)>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
