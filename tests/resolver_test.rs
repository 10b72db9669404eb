//! Media resolver tests
//!
//! The two-step handshake against a mocked backend: the preparatory watch
//! call is best effort, the player call decides the outcome.

use dramatui::api::{DramaClient, MediaResolver, Resolve, ResolutionFailure};
use dramatui::models::{MediaLocation, PlaybackTarget};
use mockito::{Matcher, Server, ServerGuard};

async fn mock_watch(server: &mut ServerGuard, status: usize) -> mockito::Mock {
    server
        .mock("GET", "/watch/41000102/0")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lang".into(), "in".into()),
            Matcher::UrlEncoded("source".into(), "search_result".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await
}

async fn mock_player(server: &mut ServerGuard, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("POST", "/watch/player")
        .match_query(Matcher::UrlEncoded("lang".into(), "in".into()))
        .match_body(Matcher::Json(serde_json::json!({
            "bookId": "41000102",
            "chapterIndex": 0,
            "lang": "in"
        })))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn target() -> PlaybackTarget {
    PlaybackTarget::new("41000102", 0)
}

#[tokio::test]
async fn test_resolves_nested_stream_field() {
    let mut server = Server::new_async().await;
    let watch = mock_watch(&mut server, 200).await;
    let player = mock_player(&mut server, 200, r#"{"data":{"stream":"https://x/video.mp4"}}"#).await;

    let resolver = MediaResolver::new(DramaClient::with_base_url(server.url()));
    let location = resolver.resolve(&target()).await.unwrap();

    watch.assert_async().await;
    player.assert_async().await;
    assert_eq!(location, MediaLocation::new("https://x/video.mp4"));
}

#[tokio::test]
async fn test_field_priority() {
    let mut server = Server::new_async().await;
    let _watch = mock_watch(&mut server, 200).await;
    let _player = mock_player(
        &mut server,
        200,
        r#"{"url":"https://x/root.m3u8","data":{"url":"https://x/data.m3u8","stream":"https://x/s.mp4"}}"#,
    )
    .await;

    let resolver = MediaResolver::new(DramaClient::with_base_url(server.url()));
    let location = resolver.resolve(&target()).await.unwrap();
    assert_eq!(location.as_str(), "https://x/data.m3u8");
}

#[tokio::test]
async fn test_preparatory_failure_is_ignored() {
    let mut server = Server::new_async().await;
    let _watch = mock_watch(&mut server, 500).await;
    let player = mock_player(&mut server, 200, r#"{"url":"https://x/root.m3u8"}"#).await;

    let resolver = MediaResolver::new(DramaClient::with_base_url(server.url()));
    let location = resolver.resolve(&target()).await.unwrap();

    player.assert_async().await;
    assert_eq!(location.as_str(), "https://x/root.m3u8");
}

#[tokio::test]
async fn test_missing_location_fails() {
    let mut server = Server::new_async().await;
    let _watch = mock_watch(&mut server, 200).await;
    let _player = mock_player(&mut server, 200, r#"{"data":{"url":"","cover":"x.jpg"}}"#).await;

    let resolver = MediaResolver::new(DramaClient::with_base_url(server.url()));
    let err = resolver.resolve(&target()).await.unwrap_err();
    assert_eq!(err, ResolutionFailure::new(&target()));
}

#[tokio::test]
async fn test_transport_failures_collapse() {
    let mut server = Server::new_async().await;
    let _watch = mock_watch(&mut server, 200).await;
    let _player = mock_player(&mut server, 503, "Service Unavailable").await;

    let resolver = MediaResolver::new(DramaClient::with_base_url(server.url()));
    assert!(resolver.resolve(&target()).await.is_err());

    let mut server = Server::new_async().await;
    let _watch = mock_watch(&mut server, 200).await;
    let _player = mock_player(&mut server, 200, "<html>not json</html>").await;

    let resolver = MediaResolver::new(DramaClient::with_base_url(server.url()));
    assert!(resolver.resolve(&target()).await.is_err());
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Nothing listens on port 9 of localhost
    let resolver = MediaResolver::new(DramaClient::with_base_url("http://127.0.0.1:9"));
    let err = resolver.resolve(&target()).await.unwrap_err();
    assert_eq!(err.target, target());
}
