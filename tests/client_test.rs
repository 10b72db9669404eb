//! Catalog client tests
//!
//! Endpoints, query parameters and error mapping against a mocked backend.

use dramatui::api::{ApiError, DramaClient};
use dramatui::models::{Genre, SortOrder};
use mockito::{Matcher, Server};

// =============================================================================
// Catalog Endpoints
// =============================================================================

#[tokio::test]
async fn test_rank_parses_wrapped_list() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rank/1")
        .match_query(Matcher::UrlEncoded("lang".into(), "in".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data":{"list":[
                {"bookId":"1","bookName":"Hidden Heiress","score":9.1},
                {"bookId":"2","bookName":"CEO Returns"}
            ]}}"#,
        )
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    let items = client.rank().await.unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Hidden Heiress");
    assert_eq!(items[0].score, 9.1);
}

#[tokio::test]
async fn test_latest_requests_page_size() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/new/1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lang".into(), "in".into()),
            Matcher::UrlEncoded("pageSize".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"bookId":"n1"}]"#)
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    let items = client.latest().await.unwrap();

    mock.assert_async().await;
    assert_eq!(items[0].id, "n1");
}

#[tokio::test]
async fn test_classify_sends_filter_ids() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/classify")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lang".into(), "en".into()),
            Matcher::UrlEncoded("pageNo".into(), "2".into()),
            Matcher::UrlEncoded("genre".into(), "1359".into()),
            Matcher::UrlEncoded("sort".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"items":[]}"#)
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url()).with_lang("en");
    let items = client
        .classify(2, Genre::Romance, SortOrder::Latest)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_search_encodes_keyword() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search/ceo%20wife/1")
        .match_query(Matcher::UrlEncoded("lang".into(), "in".into()))
        .with_status(200)
        .with_body(r#"{"search":[{"bookId":"s1","bookName":"The CEO's Wife"}]}"#)
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    let items = client.search("ceo wife", 1).await.unwrap();

    mock.assert_async().await;
    assert_eq!(items[0].name, "The CEO's Wife");
}

#[tokio::test]
async fn test_blank_keyword_skips_request() {
    let server = Server::new_async().await;
    let client = DramaClient::with_base_url(server.url());
    assert!(client.search("   ", 1).await.unwrap().is_empty());
    assert!(client.suggest("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_suggest_strings() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/suggest/re")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data":["revenge","rebirth"]}"#)
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    assert_eq!(client.suggest("re").await.unwrap(), vec!["revenge", "rebirth"]);
}

#[tokio::test]
async fn test_title_detail() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/chapters/41000102")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"chapterList":[{"chapterId":"a"},{"chapterId":"b"}]}"#)
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    let detail = client.title_detail("41000102").await.unwrap();

    assert_eq!(detail.item.id, "41000102");
    assert_eq!(detail.episode_count(), 2);
    assert_eq!(detail.episodes[1].id, "b");
    assert_eq!(detail.episodes[1].index, 1);
}

// =============================================================================
// Home Feed
// =============================================================================

#[tokio::test]
async fn test_home_sections_fail_independently() {
    let mut server = Server::new_async().await;
    let _for_you = server
        .mock("GET", "/foryou/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"foryou":[{"bookId":"f1"}]}"#)
        .create_async()
        .await;
    let _latest = server
        .mock("GET", "/new/1")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let _rank = server
        .mock("GET", "/rank/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    let feed = client.home().await;

    assert_eq!(feed.for_you.len(), 1);
    assert!(feed.latest.is_empty());
    assert!(feed.rank.is_empty());
    assert!(!feed.is_empty());
}

#[tokio::test]
async fn test_home_all_sections_down() {
    let client = DramaClient::with_base_url("http://127.0.0.1:9");
    assert!(client.home().await.is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_status_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/foryou/1")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    let err = client.for_you().await.unwrap_err();
    assert!(matches!(err, ApiError::Status(404)));
}

#[tokio::test]
async fn test_invalid_json_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rank/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>")
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    assert!(matches!(client.rank().await, Err(ApiError::InvalidJson(_))));
}

#[tokio::test]
async fn test_ping_reports_latency() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rank/1")
        .match_query(Matcher::UrlEncoded("lang".into(), "in".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = DramaClient::with_base_url(server.url());
    let latency = client.ping().await.unwrap();

    mock.assert_async().await;
    assert!(latency.as_secs() < 20);
}
