//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that script provider answers
//! and inject store failures without any network or disk access.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use regex::Regex;
use snd_core::error::{Error, Result};
use snd_core::traits::{EntityHandle, HistoryStore, NameRecord, ProviderClient, RankRecord};
use snd_core::{HistoryEngine, MemoryHistoryStore, Region};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    names: HashMap<String, String>,
    ranks: HashMap<String, String>,
    ids_by_name: HashMap<String, String>,
    failing_names: HashSet<String>,
    failing_ranks: HashSet<String>,
}

/// A provider whose answers are scripted by the test
///
/// Clones share the script and the call counters, so the test can keep one
/// clone and change answers between cycles.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
    name_calls: Arc<AtomicUsize>,
    rank_calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with its current name and rank
    pub fn account(self, external_id: &str, name: &str, rank: &str) -> Self {
        self.set_name(external_id, name);
        self.set_rank(external_id, rank);
        self
    }

    pub fn set_name(&self, external_id: &str, name: &str) {
        let mut script = self.script.lock().unwrap();
        script
            .names
            .insert(external_id.to_string(), name.to_string());
        script
            .ids_by_name
            .insert(name.to_lowercase(), external_id.to_string());
    }

    pub fn set_rank(&self, external_id: &str, rank: &str) {
        self.script
            .lock()
            .unwrap()
            .ranks
            .insert(external_id.to_string(), rank.to_string());
    }

    /// Make name lookups for this account fail
    pub fn fail_name(&self, external_id: &str) {
        self.script
            .lock()
            .unwrap()
            .failing_names
            .insert(external_id.to_string());
    }

    /// Make rank lookups for this account fail
    pub fn fail_rank(&self, external_id: &str) {
        self.script
            .lock()
            .unwrap()
            .failing_ranks
            .insert(external_id.to_string());
    }

    pub fn name_calls(&self) -> usize {
        self.name_calls.load(Ordering::SeqCst)
    }

    pub fn rank_calls(&self) -> usize {
        self.rank_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProviderClient for ScriptedProvider {
    async fn resolve_id_by_name(&self, name: &str) -> Result<String> {
        self.script
            .lock()
            .unwrap()
            .ids_by_name
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Summoner {}", name)))
    }

    async fn resolve_name_by_id(&self, external_id: &str) -> Result<String> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();
        if script.failing_names.contains(external_id) {
            return Err(Error::provider("scripted", "connection reset"));
        }
        script
            .names
            .get(external_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Summoner {}", external_id)))
    }

    async fn fetch_rank(&self, external_id: &str) -> Result<String> {
        self.rank_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();
        if script.failing_ranks.contains(external_id) {
            return Err(Error::provider("scripted", "league lookup failed"));
        }
        Ok(script
            .ranks
            .get(external_id)
            .cloned()
            .unwrap_or_else(|| snd_core::UNRANKED.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A memory store whose rank appends can be made to fail
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryHistoryStore,
    fail_rank_appends: Arc<Mutex<bool>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryHistoryStore) -> Self {
        Self {
            inner,
            fail_rank_appends: Arc::new(Mutex::new(false)),
        }
    }

    pub fn fail_rank_appends(&self, fail: bool) {
        *self.fail_rank_appends.lock().unwrap() = fail;
    }
}

#[async_trait::async_trait]
impl HistoryStore for FlakyStore {
    async fn create_entity(&self, external_id: &str) -> Result<EntityHandle> {
        self.inner.create_entity(external_id).await
    }

    async fn append_name(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner.append_name(handle, value, observed_at).await
    }

    async fn append_rank(
        &self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<()> {
        let fail = *self.fail_rank_appends.lock().unwrap();
        if fail {
            return Err(Error::store("disk full"));
        }
        self.inner.append_rank(handle, value, observed_at).await
    }

    async fn all_entities(&self) -> Result<Vec<EntityHandle>> {
        self.inner.all_entities().await
    }

    async fn find_entity(&self, external_id: &str) -> Result<Option<EntityHandle>> {
        self.inner.find_entity(external_id).await
    }

    async fn latest_name(&self, handle: &EntityHandle) -> Result<Option<NameRecord>> {
        self.inner.latest_name(handle).await
    }

    async fn latest_rank(&self, handle: &EntityHandle) -> Result<Option<RankRecord>> {
        self.inner.latest_rank(handle).await
    }

    async fn name_history(&self, handle: &EntityHandle) -> Result<Vec<NameRecord>> {
        self.inner.name_history(handle).await
    }

    async fn names_matching(&self, pattern: &Regex) -> Result<Vec<(EntityHandle, NameRecord)>> {
        self.inner.names_matching(pattern).await
    }

    async fn flush(&self) -> Result<()> {
        self.inner.flush().await
    }
}

/// Build an engine over a scripted provider and a shared memory store
pub fn engine_with(provider: &ScriptedProvider, store: &MemoryHistoryStore) -> HistoryEngine {
    HistoryEngine::new(
        Box::new(provider.clone()),
        Box::new(store.clone()),
        Region::Euw,
    )
}

/// Track an entity without going through the provider
pub async fn seed(
    store: &MemoryHistoryStore,
    external_id: &str,
    name: Option<&str>,
    rank: Option<&str>,
) -> EntityHandle {
    let handle = store.create_entity(external_id).await.unwrap();
    if let Some(name) = name {
        store.append_name(&handle, name, Utc::now()).await.unwrap();
    }
    if let Some(rank) = rank {
        store.append_rank(&handle, rank, Utc::now()).await.unwrap();
    }
    handle
}
