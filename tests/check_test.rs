//! Multi-store cache check tests
//!
//! Priority order, partial-failure tolerance and the no-overwrite rule.

mod common;

use common::MockStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use streamgate::store::check_magnets;
use streamgate::{StoreBinding, StoreName};

fn binding(store: MockStore) -> (Arc<MockStore>, StoreBinding) {
    let store = Arc::new(store);
    let binding = StoreBinding {
        store: store.clone(),
        token: "token".to_string(),
    };
    (store, binding)
}

fn hashes(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_primary_reports_win_over_secondary() {
    let (_, primary) = binding(MockStore::new(StoreName::RealDebrid).cached(&["h1", "h2"]));
    // secondary also has h1, but the primary's report must stand
    let (secondary_store, secondary) =
        binding(MockStore::new(StoreName::TorBox).cached(&["h1", "h3"]));

    let outcome = check_magnets(
        &[primary, secondary],
        &hashes(&["h1", "h2", "h3"]),
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(outcome.store_code("h1"), Some("RD"));
    assert_eq!(outcome.store_code("h2"), Some("RD"));
    assert_eq!(outcome.store_code("h3"), Some("TB"));
    assert!(!outcome.has_error);

    // the secondary was only asked about what the primary missed
    assert_eq!(secondary_store.check_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_secondary_skipped_when_primary_covers_all() {
    let (_, primary) = binding(MockStore::new(StoreName::RealDebrid).cached(&["h1", "h2"]));
    let (secondary_store, secondary) = binding(MockStore::new(StoreName::TorBox).cached(&["h1"]));

    let outcome = check_magnets(&[primary, secondary], &hashes(&["h1", "h2"]), None, None)
        .await
        .unwrap();

    assert_eq!(outcome.store_code("h1"), Some("RD"));
    assert_eq!(outcome.store_code("h2"), Some("RD"));
    assert_eq!(secondary_store.check_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_primary_failure_redistributes_with_fallbacks() {
    let (_, primary) = binding(MockStore::new(StoreName::RealDebrid).failing_check());
    let (_, secondary) = binding(MockStore::new(StoreName::TorBox).cached(&["h1"]));

    let outcome = check_magnets(&[primary, secondary], &hashes(&["h1", "h2"]), None, None)
        .await
        .unwrap();

    assert_eq!(outcome.store_code("h1"), Some("TB"));
    assert_eq!(outcome.store_code("h2"), None);
    assert!(outcome.has_error);
    assert!(outcome.errors[0].is_some());
    assert!(outcome.errors[1].is_none());
}

#[tokio::test]
async fn test_sole_binding_failure_fails_the_check() {
    let (_, primary) = binding(MockStore::new(StoreName::RealDebrid).failing_check());

    let result = check_magnets(&[primary], &hashes(&["h1"]), None, None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_secondary_failure_is_absorbed() {
    let (_, primary) = binding(MockStore::new(StoreName::RealDebrid).cached(&["h1"]));
    let (_, bad) = binding(MockStore::new(StoreName::TorBox).failing_check());
    let (_, good) = binding(MockStore::new(StoreName::Premiumize).cached(&["h2"]));

    let outcome = check_magnets(&[primary, bad, good], &hashes(&["h1", "h2"]), None, None)
        .await
        .unwrap();

    assert_eq!(outcome.store_code("h1"), Some("RD"));
    assert_eq!(outcome.store_code("h2"), Some("PM"));
    assert!(outcome.has_error);
    assert!(outcome.errors[1].is_some());
    assert!(outcome.errors[2].is_none());
}

#[tokio::test]
async fn test_no_bindings_is_an_error() {
    let result = check_magnets(&[], &hashes(&["h1"]), None, None).await;
    assert!(result.is_err());
}
