//! Architectural Contract Test: Failure Isolation
//!
//! This test verifies that one failing account never aborts a batch.
//!
//! Constraints verified:
//! - A name lookup failure marks only that entity as failed
//! - Entities after a failure are still processed
//! - Writes made before a mid-entity store failure are kept
//!
//! If this test fails, a single bad account can stall the whole history.

mod common;

use common::*;
use snd_core::traits::HistoryStore;
use snd_core::{EntityOutcome, HistoryEngine, MemoryHistoryStore, Region};

#[tokio::test]
async fn failing_entity_does_not_stop_the_cycle() {
    let provider = ScriptedProvider::new()
        .account("1", "First2", "GOLD I 10LP")
        .account("2", "Second", "GOLD I 10LP")
        .account("3", "Third2", "GOLD I 10LP");
    provider.fail_name("2");

    let store = MemoryHistoryStore::new();
    let first = seed(&store, "1", Some("First"), Some("GOLD I 10LP")).await;
    let second = seed(&store, "2", Some("Second"), Some("GOLD I 10LP")).await;
    let third = seed(&store, "3", Some("Third"), Some("GOLD I 10LP")).await;
    let engine = engine_with(&provider, &store);

    let report = engine.run_update_cycle().await.expect("cycle completes");

    assert_eq!(report.len(), 3);
    assert_eq!(report.failed(), 1);
    assert!(report.outcome("2").unwrap().is_failed());
    assert_eq!(report.outcome("1"), Some(&EntityOutcome::NameUpdated));
    assert_eq!(report.outcome("3"), Some(&EntityOutcome::NameUpdated));

    let latest = |h| {
        let store = store.clone();
        async move { store.latest_name(&h).await.unwrap().unwrap().value }
    };
    assert_eq!(latest(first).await, "First2");
    assert_eq!(latest(second).await, "Second");
    assert_eq!(latest(third).await, "Third2");
}

#[tokio::test]
async fn failed_name_lookup_skips_rank_lookup() {
    let provider = ScriptedProvider::new().account("1", "Gone", "GOLD I 10LP");
    provider.fail_name("1");
    let store = MemoryHistoryStore::new();
    seed(&store, "1", Some("Gone"), Some("GOLD I 10LP")).await;
    let engine = engine_with(&provider, &store);

    engine.run_update_cycle().await.unwrap();

    assert_eq!(provider.name_calls(), 1);
    assert_eq!(provider.rank_calls(), 0);
}

#[tokio::test]
async fn name_append_survives_rank_append_failure() {
    let provider = ScriptedProvider::new().account("1", "Renamed", "MASTER I 1LP");
    let memory = MemoryHistoryStore::new();
    let handle = seed(&memory, "1", Some("Original"), Some("DIAMOND I 99LP")).await;

    let store = FlakyStore::new(memory.clone());
    store.fail_rank_appends(true);
    let engine = HistoryEngine::new(Box::new(provider.clone()), Box::new(store), Region::Euw);

    let report = engine.run_update_cycle().await.unwrap();

    assert!(report.outcome("1").unwrap().is_failed());
    let names = memory.name_history(&handle).await.unwrap();
    assert_eq!(names.last().unwrap().value, "Renamed");
    let ranks = memory.rank_history(&handle).await.unwrap();
    assert_eq!(ranks.len(), 1);
    assert_eq!(ranks[0].value, "DIAMOND I 99LP");
}

#[tokio::test]
async fn empty_store_produces_empty_report() {
    let provider = ScriptedProvider::new();
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);

    let report = engine.run_update_cycle().await.unwrap();

    assert!(report.is_empty());
    assert_eq!(provider.name_calls(), 0);
}
