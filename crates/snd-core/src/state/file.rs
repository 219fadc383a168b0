// # File History Store
//
// File-based implementation of HistoryStore with crash recovery.
//
// ## Purpose
//
// Keeps one region's account history across runs. The whole ledger is held
// in memory and rewritten after every append; a region tracks at most a few
// thousand accounts, so the file stays small.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "last_id": 1,
//   "entities": [
//     {
//       "id": 1,
//       "external_id": "12345",
//       "names": [{ "value": "Faker", "observed_at": "2025-01-09T12:00:00Z" }],
//       "ranks": [{ "value": "UNRANKED", "observed_at": "2025-01-09T12:00:00Z" }]
//     }
//   ]
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use super::ledger::Ledger;
use crate::Error;
use crate::traits::history_store::{EntityHandle, HistoryStore, NameRecord, RankRecord};

/// Store file format version
/// Used for future migration if format changes
const STORE_FILE_VERSION: &str = "1.0";

/// File-based history store with crash recovery
///
/// # Example
///
/// ```rust,no_run
/// use snd_core::state::FileHistoryStore;
/// use snd_core::traits::HistoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileHistoryStore::new("/var/lib/snd/snd_euw.json").await?;
///
///     // Create and seed (atomically written to disk)
///     let handle = store.create_entity("12345").await?;
///     store.append_name(&handle, "Faker", chrono::Utc::now()).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

/// Internal state for file-based store
#[derive(Debug)]
struct FileState {
    ledger: Ledger,
    dirty: bool,
}

/// Serializable store file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StoreFileFormat {
    version: String,
    #[serde(flatten)]
    ledger: Ledger,
}

impl FileHistoryStore {
    /// Create or load a file history store
    ///
    /// This will:
    /// 1. Try to load existing store file
    /// 2. If corruption detected, try to load from backup
    /// 3. If both fail, start with an empty history
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let ledger = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                ledger,
                dirty: false,
            })),
        })
    }

    /// Path of the main store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger from file with automatic recovery
    ///
    /// Recovery strategy:
    /// 1. Try to load main store file
    /// 2. If JSON parse error, try loading backup
    /// 3. If backup also fails, start with an empty history
    async fn load_with_recovery(path: &Path) -> Result<Ledger, Error> {
        let error = match Self::load(path).await {
            Ok(ledger) => {
                tracing::debug!("Loaded store from file: {} entities", ledger.len());
                return Ok(ledger);
            }
            Err(e) => e,
        };

        // Anything other than a parse failure is not corruption
        if !matches!(error, Error::Json(_)) {
            return Err(error);
        }

        tracing::warn!(
            "Store file {} appears corrupted: {}. Attempting recovery from backup.",
            path.display(),
            error
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty history.");
            return Ok(Ledger::default());
        }

        match Self::load(&backup_path).await {
            Ok(ledger) => {
                tracing::info!("Recovered store from backup: {} entities", ledger.len());

                // Restore corrupted file from backup
                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!("Failed to restore store file from backup: {}", restore_err);
                }

                Ok(ledger)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also corrupted: {}. Starting with empty history.",
                    backup_err
                );
                Ok(Ledger::default())
            }
        }
    }

    /// Load the ledger from file
    async fn load(path: &Path) -> Result<Ledger, Error> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(Ledger::default());
        }

        // Bytes, not text: invalid UTF-8 is corruption like any other parse failure
        let bytes = fs::read(path)
            .await
            .map_err(store_io("read store file", path))?;

        let store_file: StoreFileFormat = serde_json::from_slice(&bytes)?;

        if store_file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                STORE_FILE_VERSION,
                store_file.version
            );
        }

        Ok(store_file.ledger)
    }

    /// Write the ledger to file atomically
    async fn write(&self) -> Result<(), Error> {
        let mut state_guard = self.state.write().await;

        let store_file = StoreFileFormat {
            version: STORE_FILE_VERSION.to_string(),
            ledger: state_guard.ledger.clone(),
        };

        let json = serde_json::to_string_pretty(&store_file)
            .map_err(|e| Error::store(format!("Failed to serialize store: {}", e)))?;

        // Write to temporary file first, then swap it in
        let temp_path = self.temp_path();
        fs::write(&temp_path, json.as_bytes())
            .await
            .map_err(store_io("write temp file", &temp_path))?;

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(store_io("replace store file with", &temp_path))?;

        state_guard.dirty = false;

        tracing::trace!("Store written to file: {}", self.path.display());
        Ok(())
    }

    /// Restore store file from backup
    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path)
            .await
            .map_err(store_io("restore store file from", backup_path))?;

        tracing::info!("Restored {} from backup", path.display());
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Apply a mutation to the ledger, then persist it
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Ledger) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let value = {
            let mut state_guard = self.state.write().await;
            let value = apply(&mut state_guard.ledger)?;
            state_guard.dirty = true;
            value
        };

        // Immediate write for durability
        self.write().await?;
        Ok(value)
    }
}

/// Map an I/O failure on `path` to a store error naming the action
fn store_io<'a>(action: &'a str, path: &'a Path) -> impl FnOnce(std::io::Error) -> Error + 'a {
    move |e| Error::store(format!("Failed to {} {}: {}", action, path.display(), e))
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn create_entity(&self, external_id: &str) -> Result<EntityHandle, Error> {
        self.mutate(|ledger| ledger.create(external_id)).await
    }

    async fn append_name(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.mutate(|ledger| ledger.append_name(handle, value, observed_at))
            .await
    }

    async fn append_rank(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.mutate(|ledger| ledger.append_rank(handle, value, observed_at))
            .await
    }

    async fn all_entities(&self) -> Result<Vec<EntityHandle>, Error> {
        Ok(self.state.read().await.ledger.handles())
    }

    async fn find_entity(&self, external_id: &str) -> Result<Option<EntityHandle>, Error> {
        Ok(self.state.read().await.ledger.find(external_id))
    }

    async fn latest_name(&self, handle: &EntityHandle) -> Result<Option<NameRecord>, Error> {
        self.state.read().await.ledger.latest_name(handle)
    }

    async fn latest_rank(&self, handle: &EntityHandle) -> Result<Option<RankRecord>, Error> {
        self.state.read().await.ledger.latest_rank(handle)
    }

    async fn name_history(&self, handle: &EntityHandle) -> Result<Vec<NameRecord>, Error> {
        self.state.read().await.ledger.name_history(handle)
    }

    async fn names_matching(
        &self,
        pattern: &Regex,
    ) -> Result<Vec<(EntityHandle, NameRecord)>, Error> {
        Ok(self.state.read().await.ledger.names_matching(pattern))
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty { self.write().await } else { Ok(()) }
    }
}
