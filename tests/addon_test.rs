//! Addon client tests
//!
//! Manifest and stream fetching over the addon protocol path shape.

use mockito::Server;
use streamgate::models::ResourceName;
use streamgate::{AddonClient, AddonError};

#[tokio::test]
async fn test_fetch_manifest() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/manifest.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "org.example.addon",
                "name": "Example",
                "version": "1.2.3",
                "resources": ["stream", {"name": "meta", "types": ["movie"]}],
                "types": ["movie", "series"],
                "idPrefixes": ["tt"]
            }"#,
        )
        .create_async()
        .await;

    let client = AddonClient::new();
    let manifest = client.manifest(&server.url()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(manifest.id, "org.example.addon");
    assert!(manifest.supports(ResourceName::Stream, "series", "tt123"));
    assert!(manifest.supports(ResourceName::Meta, "movie", "tt123"));
    assert!(!manifest.supports(ResourceName::Meta, "series", "tt123"));
}

#[tokio::test]
async fn test_fetch_manifest_accepts_manifest_url() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/manifest.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "org.x", "name": "X", "resources": [], "types": []}"#)
        .create_async()
        .await;

    let client = AddonClient::new();
    let url = format!("{}/manifest.json", server.url());
    let manifest = client.manifest(&url).await.unwrap();
    assert_eq!(manifest.id, "org.x");
}

#[tokio::test]
async fn test_fetch_streams_path_shape() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/stream/series/tt0903747%3A1%3A2.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "streams": [
                    {
                        "name": "Addon\n1080p",
                        "title": "Show.S01E02.1080p.WEB\n👤 12 💾 2.1 GB ⚙️ Rarbg",
                        "infoHash": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                        "fileIdx": 1
                    }
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = AddonClient::new();
    let response = client
        .streams(&server.url(), "series", "tt0903747:1:2")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.streams.len(), 1);
    assert_eq!(
        response.streams[0].info_hash,
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
    );
    assert_eq!(response.streams[0].file_idx, Some(1));
}

#[tokio::test]
async fn test_missing_resource_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/stream/movie/tt0000000.json")
        .with_status(404)
        .create_async()
        .await;

    let client = AddonClient::new();
    let err = client
        .streams(&server.url(), "movie", "tt0000000")
        .await
        .unwrap_err();
    assert!(matches!(err, AddonError::NotFound));
}

#[tokio::test]
async fn test_server_error_carries_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/stream/movie/tt0000001.json")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let client = AddonClient::new();
    let err = client
        .streams(&server.url(), "movie", "tt0000001")
        .await
        .unwrap_err();
    match err {
        AddonError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/stream/movie/tt0000002.json")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = AddonClient::new();
    let err = client
        .streams(&server.url(), "movie", "tt0000002")
        .await
        .unwrap_err();
    assert!(matches!(err, AddonError::InvalidResponse(_)));
}
