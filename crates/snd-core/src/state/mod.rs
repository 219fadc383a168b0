// # History Store Implementations
//
// This module provides implementations of the HistoryStore trait for
// different persistence strategies.

pub mod file;
mod ledger;
pub mod memory;

pub use file::FileHistoryStore;
pub use memory::MemoryHistoryStore;

use crate::config::{SndConfig, StoreConfig};
use crate::error::{Error, Result};
use crate::traits::HistoryStore;

/// Open the history store described by a configuration
///
/// File stores are keyed by region: `<dir>/snd_<region>.json`.
pub async fn open_store(config: &SndConfig) -> Result<Box<dyn HistoryStore>> {
    match &config.store {
        StoreConfig::Memory => Ok(Box::new(MemoryHistoryStore::new())),
        StoreConfig::File { .. } => {
            let path = config
                .store_path()
                .ok_or_else(|| Error::config("File store has no path"))?;
            tracing::debug!("Opening history store {}", path.display());
            Ok(Box::new(FileHistoryStore::new(path).await?))
        }
    }
}
