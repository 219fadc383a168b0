//! Core traits for the SND system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ProviderClient`]: Read current account state from the game API
//! - [`HistoryStore`]: Append-only per-account name and rank history

pub mod history_store;
pub mod provider;

pub use history_store::{EntityHandle, EntityId, HistoryStore, NameRecord, RankRecord};
pub use provider::ProviderClient;
