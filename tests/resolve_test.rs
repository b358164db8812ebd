//! Resolution engine tests
//!
//! Coalescing, poll classification, file selection failures and response
//! caching, all against an in-memory store.

mod common;

use common::{video_file, MockStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use streamgate::store::MagnetStatus;
use streamgate::{
    FailureClass, MediaId, PassthroughIssuer, PlaybackResult, ResolveRequest, Resolver,
    StoreBinding, StoreName,
};

const HASH: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn resolver() -> Resolver {
    Resolver::new(
        Arc::new(PassthroughIssuer),
        "https://gw.example/videos",
    )
    .with_poll(3, Duration::from_millis(1))
}

fn request(store: Arc<MockStore>) -> ResolveRequest {
    ResolveRequest {
        binding: StoreBinding {
            store,
            token: "token".to_string(),
        },
        hash: HASH.to_string(),
        file_idx: -1,
        file_name: String::new(),
        media_id: None,
        pattern: None,
        client_ip: None,
    }
}

#[tokio::test]
async fn test_resolves_downloaded_magnet_to_link() {
    let store = Arc::new(
        MockStore::new(StoreName::RealDebrid).files(vec![video_file(0, "Movie.mkv", 1000)]),
    );
    let result = resolver().resolve(request(store.clone())).await;

    match result {
        PlaybackResult::Link(url) => assert_eq!(url, "https://backend.example/dl/0?signed=1"),
        other => panic!("expected link, got {other:?}"),
    }
    assert_eq!(store.add_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.link_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_identical_requests_coalesce() {
    let store = Arc::new(
        MockStore::new(StoreName::RealDebrid)
            .add_delay(Duration::from_millis(50))
            .files(vec![video_file(0, "Movie.mkv", 1000)]),
    );
    let resolver = Arc::new(resolver());

    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let request = request(store.clone());
            tokio::spawn(async move { resolver.resolve(request).await })
        })
        .collect();

    for task in tasks {
        match task.await.unwrap() {
            PlaybackResult::Link(_) => {}
            other => panic!("expected link, got {other:?}"),
        }
    }
    // exactly one backend add for N concurrent identical requests
    assert_eq!(store.add_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_resolved_link_is_cached() {
    let store = Arc::new(
        MockStore::new(StoreName::RealDebrid).files(vec![video_file(0, "Movie.mkv", 1000)]),
    );
    let resolver = resolver();

    let first = resolver.resolve(request(store.clone())).await;
    let second = resolver.resolve(request(store.clone())).await;

    assert_eq!(first, second);
    assert_eq!(store.add_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_poll_exhaustion_while_queued_is_downloading() {
    let store = Arc::new(
        MockStore::new(StoreName::RealDebrid)
            .add_status(MagnetStatus::Queued)
            .poll_statuses(&[MagnetStatus::Queued]),
    );
    let result = resolver().resolve(request(store.clone())).await;

    match result {
        PlaybackResult::Fallback { class, url } => {
            assert_eq!(class, FailureClass::Downloading);
            assert_eq!(url, "https://gw.example/videos/downloading.mp4");
        }
        other => panic!("expected fallback, got {other:?}"),
    }
    // full retry budget spent before classifying
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_poll_reaching_downloaded_succeeds() {
    let store = Arc::new(
        MockStore::new(StoreName::RealDebrid)
            .add_status(MagnetStatus::Downloading)
            .poll_statuses(&[MagnetStatus::Downloading, MagnetStatus::Downloaded])
            .files(vec![video_file(0, "Movie.mkv", 1000)]),
    );
    let result = resolver().resolve(request(store.clone())).await;
    assert!(matches!(result, PlaybackResult::Link(_)));
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_magnet_is_download_failed() {
    let store = Arc::new(
        MockStore::new(StoreName::RealDebrid)
            .add_status(MagnetStatus::Failed)
            .poll_statuses(&[MagnetStatus::Failed]),
    );
    let result = resolver().resolve(request(store)).await;

    match result {
        PlaybackResult::Fallback { class, .. } => {
            assert_eq!(class, FailureClass::DownloadFailed);
        }
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_video_files_is_no_matching_file() {
    let store = Arc::new(MockStore::new(StoreName::RealDebrid).files(vec![
        common::video_file(0, "readme.nfo", 10),
        common::video_file(1, "subs.srt", 10),
    ]));
    let result = resolver().resolve(request(store)).await;

    match result {
        PlaybackResult::Fallback { class, url } => {
            assert_eq!(class, FailureClass::NoMatchingFile);
            assert_eq!(url, "https://gw.example/videos/no_matching_file.mp4");
        }
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_is_cached_briefly() {
    let store = Arc::new(
        MockStore::new(StoreName::RealDebrid)
            .add_status(MagnetStatus::Queued)
            .poll_statuses(&[MagnetStatus::Queued]),
    );
    let resolver = resolver();

    let first = resolver.resolve(request(store.clone())).await;
    assert!(matches!(first, PlaybackResult::Fallback { .. }));
    let adds = store.add_calls.load(Ordering::SeqCst);

    // repeat within the failure TTL serves the informational video from
    // cache without touching the backend again
    let second = resolver.resolve(request(store.clone())).await;
    match second {
        PlaybackResult::Link(url) => {
            assert_eq!(url, "https://gw.example/videos/downloading.mp4");
        }
        other => panic!("expected cached redirect, got {other:?}"),
    }
    assert_eq!(store.add_calls.load(Ordering::SeqCst), adds);
}

#[tokio::test]
async fn test_episode_pattern_selects_file() {
    let store = Arc::new(MockStore::new(StoreName::RealDebrid).files(vec![
        video_file(0, "Show.S01E01.mkv", 500),
        video_file(1, "Show.S01E02.mkv", 400),
        video_file(2, "Show.S01E03.mkv", 600),
    ]));
    let mut req = request(store);
    req.media_id = Some(MediaId::parse("tt0903747:1:2").unwrap());

    let result = resolver().resolve(req).await;
    match result {
        PlaybackResult::Link(url) => {
            // file index 1 carries S01E02
            assert_eq!(url, "https://backend.example/dl/1?signed=1");
        }
        other => panic!("expected link, got {other:?}"),
    }
}
