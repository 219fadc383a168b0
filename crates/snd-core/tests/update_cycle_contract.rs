//! Architectural Contract Test: Update Cycle
//!
//! This test verifies the record-on-change policy of the history engine.
//!
//! Constraints verified:
//! - Adding an account seeds exactly one name and one rank record
//! - A name record is appended on any change, including case-only changes
//! - A rank record is appended only when the new rank strictly beats the peak
//! - Unchanged accounts append nothing
//! - A failed rank lookup collapses to UNRANKED and never lowers the peak
//!
//! If this test fails, the history no longer reflects the change policy.

mod common;

use common::*;
use snd_core::traits::HistoryStore;
use snd_core::{EntityOutcome, MemoryHistoryStore, UNRANKED};

#[tokio::test]
async fn add_seeds_one_name_and_one_rank_record() {
    let provider = ScriptedProvider::new().account("12345", "Faker", "CHALLENGER I 900LP");
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);

    let handle = engine.add_by_id("12345").await.expect("add succeeds");

    let names = store.name_history(&handle).await.unwrap();
    let ranks = store.rank_history(&handle).await.unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].value, "Faker");
    assert_eq!(ranks.len(), 1);
    assert_eq!(ranks[0].value, "CHALLENGER I 900LP");
}

#[tokio::test]
async fn add_without_solo_rank_seeds_unranked() {
    let provider = ScriptedProvider::new();
    provider.set_name("777", "Newcomer");
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);

    let handle = engine.add_by_name("newcomer").await.expect("add succeeds");

    assert_eq!(handle.external_id, "777");
    let rank = store.latest_rank(&handle).await.unwrap().unwrap();
    assert_eq!(rank.value, UNRANKED);
}

#[tokio::test]
async fn lp_drop_is_ignored_and_promotion_is_recorded() {
    let provider = ScriptedProvider::new().account("1", "Climber", "GOLD III 40LP");
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);
    let handle = engine.add_by_id("1").await.unwrap();

    // Lost 5 LP: the peak stays
    provider.set_rank("1", "GOLD III 35LP");
    let report = engine.run_update_cycle().await.unwrap();
    assert_eq!(report.outcome("1"), Some(&EntityOutcome::NoChange));
    assert_eq!(store.rank_history(&handle).await.unwrap().len(), 1);

    // Promoted with zero LP: a better tier wins regardless of LP
    provider.set_rank("1", "GOLD II 0LP");
    let report = engine.run_update_cycle().await.unwrap();
    assert_eq!(report.outcome("1"), Some(&EntityOutcome::RankUpdated));

    let ranks = store.rank_history(&handle).await.unwrap();
    let values: Vec<_> = ranks.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["GOLD III 40LP", "GOLD II 0LP"]);
}

#[tokio::test]
async fn equal_rank_is_not_recorded_twice() {
    let provider = ScriptedProvider::new().account("1", "Steady", "PLATINUM IV 50LP");
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);
    let handle = engine.add_by_id("1").await.unwrap();

    engine.run_update_cycle().await.unwrap();
    engine.run_update_cycle().await.unwrap();

    assert_eq!(store.rank_history(&handle).await.unwrap().len(), 1);
    assert_eq!(store.name_history(&handle).await.unwrap().len(), 1);
}

#[tokio::test]
async fn case_only_rename_is_recorded() {
    let provider = ScriptedProvider::new().account("1", "faker", "MASTER I 10LP");
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);
    let handle = engine.add_by_id("1").await.unwrap();

    provider.set_name("1", "Faker");
    let report = engine.run_update_cycle().await.unwrap();

    assert_eq!(report.outcome("1"), Some(&EntityOutcome::NameUpdated));
    let names: Vec<_> = store
        .name_history(&handle)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.value)
        .collect();
    assert_eq!(names, vec!["faker", "Faker"]);
}

#[tokio::test]
async fn rename_and_promotion_in_one_cycle() {
    let provider = ScriptedProvider::new().account("1", "Old", "SILVER I 90LP");
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);
    engine.add_by_id("1").await.unwrap();

    provider.set_name("1", "New");
    provider.set_rank("1", "GOLD V 0LP");
    let report = engine.run_update_cycle().await.unwrap();

    assert_eq!(report.outcome("1"), Some(&EntityOutcome::BothUpdated));
    assert_eq!(report.names_updated(), 1);
    assert_eq!(report.ranks_updated(), 1);
}

#[tokio::test]
async fn failed_rank_lookup_keeps_peak_and_still_tracks_name() {
    let provider = ScriptedProvider::new().account("1", "Before", "DIAMOND II 20LP");
    let store = MemoryHistoryStore::new();
    let engine = engine_with(&provider, &store);
    let handle = engine.add_by_id("1").await.unwrap();

    provider.set_name("1", "After");
    provider.fail_rank("1");
    let report = engine.run_update_cycle().await.unwrap();

    assert_eq!(report.outcome("1"), Some(&EntityOutcome::NameUpdated));
    let peak = store.latest_rank(&handle).await.unwrap().unwrap();
    assert_eq!(peak.value, "DIAMOND II 20LP");
}

#[tokio::test]
async fn entity_without_history_records_first_observation() {
    let provider = ScriptedProvider::new().account("5", "Imported", "BRONZE V 0LP");
    let store = MemoryHistoryStore::new();
    let handle = seed(&store, "5", None, None).await;
    let engine = engine_with(&provider, &store);

    let report = engine.run_update_cycle().await.unwrap();

    assert_eq!(report.outcome("5"), Some(&EntityOutcome::BothUpdated));
    assert_eq!(store.name_history(&handle).await.unwrap().len(), 1);
    assert_eq!(store.rank_history(&handle).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cycle_issues_one_name_and_one_rank_lookup_per_entity() {
    let provider = ScriptedProvider::new()
        .account("1", "A", "GOLD I 1LP")
        .account("2", "B", "GOLD I 2LP");
    let store = MemoryHistoryStore::new();
    seed(&store, "1", Some("A"), Some("GOLD I 1LP")).await;
    seed(&store, "2", Some("B"), Some("GOLD I 2LP")).await;
    let engine = engine_with(&provider, &store);

    let report = engine.run_update_cycle().await.unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(provider.name_calls(), 2);
    assert_eq!(provider.rank_calls(), 2);
}

#[tokio::test]
async fn failed_rank_lookup_never_replaces_a_bronze_peak() {
    for peak in ["BRONZE I 0LP", "BRONZE IV 10LP", "BRONZE V 0LP"] {
        let provider = ScriptedProvider::new().account("1", "Grinder", peak);
        let store = MemoryHistoryStore::new();
        let engine = engine_with(&provider, &store);
        let handle = engine.add_by_id("1").await.unwrap();

        provider.fail_rank("1");
        let report = engine.run_update_cycle().await.unwrap();

        assert_eq!(report.outcome("1"), Some(&EntityOutcome::NoChange));
        let ranks: Vec<_> = store
            .rank_history(&handle)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(ranks, vec![peak.to_string()]);
    }
}
