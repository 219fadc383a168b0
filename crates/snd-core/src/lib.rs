// # snd-core
//
// Core library for the Summoner Name Database: a tracker that polls the
// game API and keeps an append-only history of every account's display
// names and peak ranks.
//
// ## Architecture Overview
//
// - **rank**: Total order over rank descriptors and the `is_higher` predicate
// - **detector**: Pure "should this be recorded?" rules for names and ranks
// - **ProviderClient**: Trait for reading current account state
// - **HistoryStore**: Trait for the append-only, per-account history
// - **HistoryEngine**: Orchestrates fetch → detect → append for a region
// - **HistoryQuery**: Read-only list/find queries over a store
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Change rules are pure; I/O sits behind traits
// 2. **Append-Only**: History records are never edited or removed
// 3. **Sequential**: One region, one process, one request at a time
// 4. **Library-First**: The CLI is a thin shell over this crate
// 5. **Failure Isolation**: A failing account never aborts a batch

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod query;
pub mod rank;
pub mod state;
pub mod traits;

/// Human-readable application name
pub const APP_NAME: &str = "Summoner Name Database";

// Re-export core types for convenience
pub use config::{KeyTier, ProviderConfig, Region, SndConfig, StoreConfig};
pub use engine::{AddReport, EntityOutcome, HistoryEngine, UpdateReport};
pub use error::{Error, Result};
pub use query::{HistoryQuery, Timeline};
pub use rank::{UNRANKED, is_higher};
pub use state::{FileHistoryStore, MemoryHistoryStore, open_store};
pub use traits::{EntityHandle, EntityId, HistoryStore, NameRecord, ProviderClient, RankRecord};
