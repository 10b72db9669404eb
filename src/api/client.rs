//! Drama backend API client
//!
//! Thin transport over the upstream REST service. Every response is treated
//! as untrusted JSON and handed to the normalizer; nothing here assumes a
//! stable response shape.

use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::normalize;
use crate::config::Config;
use crate::models::{CatalogItem, Genre, HomeFeed, PlaybackTarget, SortOrder, TitleDetail};

/// Default upstream root (endpoints hang off `/api`)
pub const DEFAULT_BASE_URL: &str = "https://restxdb.onrender.com/api";

/// Default content language
pub const DEFAULT_LANG: &str = "in";

/// Upper bound for ordinary requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound for the reachability probe
pub const PING_TIMEOUT: Duration = Duration::from_secs(20);

/// Page size requested for the "latest" home section
const LATEST_PAGE_SIZE: u32 = 10;

/// Source tag sent with the preparatory watch call
const WATCH_SOURCE: &str = "search_result";

/// Transport-level failures
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ApiError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Request(err)
        }
    }
}

/// Body of the player resolution call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRequest<'a> {
    book_id: &'a str,
    chapter_index: usize,
    lang: &'a str,
}

/// Drama backend client
#[derive(Debug, Clone)]
pub struct DramaClient {
    base_url: String,
    lang: String,
    client: reqwest::Client,
}

impl DramaClient {
    /// Create a client against the public backend
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::build(base_url.into(), DEFAULT_LANG.to_string(), DEFAULT_TIMEOUT)
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::build(
            config.base_url(),
            config.lang.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn build(base_url: String, lang: String, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            lang,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Override the content language
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode its JSON body
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Value, ApiError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(path, error = %e, "request failed");
                ApiError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "upstream returned error status");
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(ApiError::from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(path, error = %e, "response is not JSON");
            ApiError::InvalidJson(e.to_string())
        })
    }

    /// GET with the language parameter plus any extra query pairs
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        debug!(path, "GET");
        let request = self
            .client
            .get(self.url(path))
            .query(&[("lang", self.lang.as_str())])
            .query(query);
        self.send(request, path).await
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Home section: personalised picks
    pub async fn for_you(&self) -> Result<Vec<CatalogItem>, ApiError> {
        let json = self.get_json("/foryou/1", &[]).await?;
        Ok(normalize::extract_list(&json))
    }

    /// Home section: newest releases
    pub async fn latest(&self) -> Result<Vec<CatalogItem>, ApiError> {
        let json = self
            .get_json("/new/1", &[("pageSize", LATEST_PAGE_SIZE.to_string())])
            .await?;
        Ok(normalize::extract_list(&json))
    }

    /// Home section: ranking
    pub async fn rank(&self) -> Result<Vec<CatalogItem>, ApiError> {
        let json = self.get_json("/rank/1", &[]).await?;
        Ok(normalize::extract_list(&json))
    }

    /// Load all three home sections concurrently
    ///
    /// Sections fail independently; a failed section is empty.
    pub async fn home(&self) -> HomeFeed {
        let (for_you, latest, rank) = futures::join!(self.for_you(), self.latest(), self.rank());
        let section = |name: &str, result: Result<Vec<CatalogItem>, ApiError>| {
            result.unwrap_or_else(|e| {
                warn!(section = name, error = %e, "home section unavailable");
                Vec::new()
            })
        };
        HomeFeed {
            for_you: section("foryou", for_you),
            latest: section("latest", latest),
            rank: section("rank", rank),
        }
    }

    /// Browse by genre and sort order
    pub async fn classify(
        &self,
        page: u32,
        genre: Genre,
        sort: SortOrder,
    ) -> Result<Vec<CatalogItem>, ApiError> {
        let json = self
            .get_json(
                "/classify",
                &[
                    ("pageNo", page.to_string()),
                    ("genre", genre.id().to_string()),
                    ("sort", sort.id().to_string()),
                ],
            )
            .await?;
        Ok(normalize::extract_list(&json))
    }

    /// Search-as-you-type suggestions
    pub async fn suggest(&self, keyword: &str) -> Result<Vec<String>, ApiError> {
        if keyword.trim().is_empty() {
            return Ok(Vec::new());
        }
        let path = format!("/suggest/{}", urlencoding::encode(keyword));
        let json = self.get_json(&path, &[]).await?;
        Ok(normalize::extract_strings(&json))
    }

    /// Full search
    pub async fn search(&self, keyword: &str, page: u32) -> Result<Vec<CatalogItem>, ApiError> {
        if keyword.trim().is_empty() {
            return Ok(Vec::new());
        }
        let path = format!("/search/{}/{}", urlencoding::encode(keyword), page);
        let json = self.get_json(&path, &[]).await?;
        Ok(normalize::extract_list(&json))
    }

    /// Title detail with its episode list
    pub async fn title_detail(&self, title_id: &str) -> Result<TitleDetail, ApiError> {
        let path = format!("/chapters/{}", urlencoding::encode(title_id));
        let json = self.get_json(&path, &[]).await?;
        Ok(normalize::normalize_detail(&json, title_id))
    }

    /// Round-trip latency of a lightweight endpoint
    pub async fn ping(&self) -> Result<Duration, ApiError> {
        let start = Instant::now();
        let request = self
            .client
            .get(self.url("/rank/1"))
            .query(&[("lang", self.lang.as_str())])
            .timeout(PING_TIMEOUT);
        self.send(request, "/rank/1").await?;
        Ok(start.elapsed())
    }

    // -------------------------------------------------------------------------
    // Playback handshake
    // -------------------------------------------------------------------------

    /// Preparatory watch call; the body is read but not interpreted
    pub async fn prepare_watch(&self, target: &PlaybackTarget) -> Result<(), ApiError> {
        let path = format!(
            "/watch/{}/{}",
            urlencoding::encode(&target.title_id),
            target.episode_index
        );
        self.get_json(&path, &[("source", WATCH_SOURCE.to_string())])
            .await
            .map(|_| ())
    }

    /// Player resolution call; returns the raw response for the resolver
    pub async fn request_player(&self, target: &PlaybackTarget) -> Result<Value, ApiError> {
        let path = "/watch/player";
        debug!(path, episode = %target, "POST");
        let request = self
            .client
            .post(self.url(path))
            .query(&[("lang", self.lang.as_str())])
            .json(&PlayerRequest {
                book_id: &target.title_id,
                chapter_index: target.episode_index,
                lang: &self.lang,
            });
        self.send(request, path).await
    }
}

impl Default for DramaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = DramaClient::with_base_url("http://localhost:9000/api/");
        assert_eq!(client.base_url(), "http://localhost:9000/api");
        assert_eq!(client.url("/rank/1"), "http://localhost:9000/api/rank/1");
    }

    #[test]
    fn test_player_request_wire_names() {
        let body = PlayerRequest {
            book_id: "41000102",
            chapter_index: 3,
            lang: "in",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"bookId": "41000102", "chapterIndex": 3, "lang": "in"})
        );
    }

    #[test]
    fn test_default_lang() {
        let client = DramaClient::new().with_lang("en");
        assert_eq!(client.lang(), "en");
    }
}
