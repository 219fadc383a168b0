//! Core history engine
//!
//! The HistoryEngine is responsible for:
//! - Iterating all tracked entities of one region
//! - Fetching their current name and rank via ProviderClient
//! - Running the change detector against the last recorded values
//! - Appending new history records and logging every change
//! - Isolating per-entity failures so one bad account never aborts a cycle
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ HistoryStore │─── all_entities() ───┐
//! └──────────────┘                      │
//!        ▲                              ▼
//!        │                     ┌───────────────┐      ┌────────────────┐
//!        │                     │ HistoryEngine │─────▶│ ProviderClient │
//!        │                     └───────────────┘      └────────────────┘
//!        │                              │
//!        │                              ▼
//!        │                     ┌───────────────┐
//!        └──── append_*() ─────│   detector    │
//!                              └───────────────┘
//! ```
//!
//! ## Update Flow (per entity, strictly sequential)
//!
//! 1. Fetch current name (failure aborts this entity only)
//! 2. Fetch current rank (failure collapses to `UNRANKED`)
//! 3. Append a name record if the name changed
//! 4. Append a rank record if the rank improved
//!
//! There is no per-entity transaction: if the name append succeeds and the
//! rank append fails, the name change is kept.

mod report;

pub use report::{AddReport, EntityOutcome, UpdateReport};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::config::Region;
use crate::detector;
use crate::error::Result;
use crate::traits::{EntityHandle, HistoryStore, ProviderClient};

/// Core history engine
///
/// One engine serves one region: its provider talks to that region's
/// endpoint and its store holds that region's history.
///
/// ## Threading
///
/// All operations run sequentially on the caller's task. Nothing is
/// spawned; the provider's rate-limit delay paces the whole cycle.
pub struct HistoryEngine {
    /// Provider for current account state
    provider: Box<dyn ProviderClient>,

    /// Append-only history
    store: Box<dyn HistoryStore>,

    /// Region this engine serves (for logging)
    region: Region,
}

impl HistoryEngine {
    /// Create a new history engine
    ///
    /// # Parameters
    ///
    /// - `provider`: Provider client for the region
    /// - `store`: History store for the region
    /// - `region`: The region both belong to
    pub fn new(
        provider: Box<dyn ProviderClient>,
        store: Box<dyn HistoryStore>,
        region: Region,
    ) -> Self {
        Self {
            provider,
            store,
            region,
        }
    }

    /// Run one update cycle over every tracked entity
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateReport)`: One outcome per entity, in store order
    /// - `Err(Error)`: The entity list could not be read, or the final
    ///   flush failed
    pub async fn run_update_cycle(&self) -> Result<UpdateReport> {
        info!(
            "Run @{} ({}) -> {}",
            crate::APP_NAME,
            self.provider.provider_name(),
            self.region.as_str().to_uppercase()
        );

        let entities = self.store.all_entities().await?;
        let report = self.update_entities(&entities).await;

        self.store.flush().await?;

        info!(
            "Update finished: {} names, {} ranks, {} unchanged, {} failed",
            report.names_updated(),
            report.ranks_updated(),
            report.unchanged(),
            report.failed()
        );
        Ok(report)
    }

    /// Run the update policy over an explicit list of entities
    ///
    /// Never fails as a whole: every per-entity error is logged and
    /// recorded as [`EntityOutcome::Failed`].
    pub async fn update_entities(&self, entities: &[EntityHandle]) -> UpdateReport {
        let mut report = UpdateReport::new(self.region);

        for handle in entities {
            let outcome = match self.update_entity(handle).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let label = self.label(handle).await;
                    error!("{} -> {}", label, e);
                    EntityOutcome::Failed(e.to_string())
                }
            };
            report.push(handle.external_id.clone(), outcome);
        }

        report
    }

    /// Update a single entity
    ///
    /// # Returns
    ///
    /// - `Ok(EntityOutcome)`: What was appended (never `Failed`)
    /// - `Err(Error)`: The name fetch or a store operation failed
    pub async fn update_entity(&self, handle: &EntityHandle) -> Result<EntityOutcome> {
        let new_name = self.provider.resolve_name_by_id(&handle.external_id).await?;
        let new_rank = self.provider.resolve_rank_by_id(&handle.external_id).await;

        let old_name = self.store.latest_name(handle).await?.map(|n| n.value);
        let old_rank = self.store.latest_rank(handle).await?.map(|r| r.value);

        let changes = detector::Changes::detect(
            &new_name,
            old_name.as_deref(),
            &new_rank,
            old_rank.as_deref(),
        );
        if !changes.any() {
            debug!("{}: no change ({}, {})", handle.external_id, new_name, new_rank);
            return Ok(EntityOutcome::NoChange);
        }

        if changes.name {
            self.store.append_name(handle, &new_name, Utc::now()).await?;
            info!(
                "Update: {} -> {}",
                old_name.as_deref().unwrap_or("<none>"),
                new_name
            );
        }

        if changes.rank {
            self.store.append_rank(handle, &new_rank, Utc::now()).await?;
            info!("Update: {} -> {}", new_name, new_rank);
        } else {
            debug!(
                "{} rank {} does not beat peak {}",
                new_name,
                new_rank,
                old_rank.as_deref().unwrap_or("<none>")
            );
        }

        Ok(EntityOutcome::from_flags(changes.name, changes.rank))
    }

    /// Start tracking an account by its external id
    ///
    /// Fetches the current name and rank first, then creates the entity and
    /// seeds one name record and one rank record.
    ///
    /// # Returns
    ///
    /// - `Ok(EntityHandle)`: The new entity
    /// - `Err(Error::DuplicateEntity)`: The id is already tracked
    /// - `Err(Error)`: The name lookup or a store operation failed
    pub async fn add_by_id(&self, external_id: &str) -> Result<EntityHandle> {
        let name = self.provider.resolve_name_by_id(external_id).await?;
        let rank = self.provider.resolve_rank_by_id(external_id).await;

        let handle = self.store.create_entity(external_id).await?;
        let now = Utc::now();
        self.store.append_name(&handle, &name, now).await?;
        self.store.append_rank(&handle, &rank, now).await?;

        info!("Success: {} -> {}", external_id, name);
        Ok(handle)
    }

    /// Start tracking an account by its current display name
    pub async fn add_by_name(&self, name: &str) -> Result<EntityHandle> {
        let external_id = self.provider.resolve_id_by_name(name).await?;
        debug!("Resolved {} -> {}", name, external_id);
        self.add_by_id(&external_id).await
    }

    /// Track several accounts by external id
    ///
    /// Each failure (including duplicates) is logged and recorded; the
    /// batch always runs to the end.
    pub async fn add_ids(&self, external_ids: &[String]) -> Result<AddReport> {
        let mut report = AddReport::default();
        for external_id in external_ids {
            match self.add_by_id(external_id).await {
                Ok(handle) => report.added.push(handle),
                Err(e) => {
                    error!("{} -> {}", external_id, e);
                    report.failed.push((external_id.clone(), e.to_string()));
                }
            }
        }
        self.store.flush().await?;
        Ok(report)
    }

    /// Track several accounts by display name
    ///
    /// Each failure (including duplicates) is logged and recorded; the
    /// batch always runs to the end.
    pub async fn add_names(&self, names: &[String]) -> Result<AddReport> {
        let mut report = AddReport::default();
        for name in names {
            match self.add_by_name(name).await {
                Ok(handle) => report.added.push(handle),
                Err(e) => {
                    error!("{} -> {}", name, e);
                    report.failed.push((name.clone(), e.to_string()));
                }
            }
        }
        self.store.flush().await?;
        Ok(report)
    }

    /// Best human-readable label for an entity in log lines
    async fn label(&self, handle: &EntityHandle) -> String {
        match self.store.latest_name(handle).await {
            Ok(Some(name)) => name.value,
            _ => handle.external_id.clone(),
        }
    }
}
