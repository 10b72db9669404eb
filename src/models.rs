//! Data structures and types for DramaTUI
//!
//! Contains all shared models used across the application organized by domain:
//! - **Catalog**: normalized titles and episode lists
//! - **Browse**: genre and sort filters for the classify endpoint
//! - **Playback**: the key of one playback attempt and its resolved location

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Catalog Models
// =============================================================================

/// Cover shown when the upstream record carries no image
pub const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/300x450?text=No+Cover";

/// One browsable drama series, normalized from an upstream record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Never empty. Generated for records without an id, so not stable across reloads.
    pub id: String,
    pub name: String,
    pub cover: String,
    pub synopsis: String,
    /// Upstream "latest chapter" marker, kept opaque
    pub latest_episode: String,
    pub score: f64,
    pub tag: String,
    pub update_time: Option<String>,
}

impl CatalogItem {
    /// Whether the item carries a score worth showing
    pub fn has_score(&self) -> bool {
        self.score > 0.0
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.has_score() {
            write!(f, " ⭐ {:.1}", self.score)?;
        }
        if !self.tag.is_empty() {
            write!(f, " [{}]", self.tag)?;
        }
        Ok(())
    }
}

/// One playable unit within a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Position in the title's episode list (0-based, contiguous)
    pub index: usize,
    pub id: String,
    pub name: String,
    pub restricted: Option<bool>,
    pub update_time: Option<String>,
}

impl EpisodeRef {
    /// 1-based episode number for display
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EP{:02} - {}", self.number(), self.name)?;
        if self.restricted == Some(true) {
            write!(f, " 🔒")?;
        }
        Ok(())
    }
}

/// A title with its ordered episode list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDetail {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Insertion order is playback order
    pub episodes: Vec<EpisodeRef>,
}

impl TitleDetail {
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn episode(&self, index: usize) -> Option<&EpisodeRef> {
        self.episodes.get(index)
    }

    /// Whether an episode exists after the given index
    pub fn has_next(&self, index: usize) -> bool {
        index + 1 < self.episodes.len()
    }
}

impl fmt::Display for TitleDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} episodes", self.item, self.episode_count())
    }
}

/// The three home sections, each loaded independently
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeFeed {
    pub for_you: Vec<CatalogItem>,
    pub latest: Vec<CatalogItem>,
    pub rank: Vec<CatalogItem>,
}

impl HomeFeed {
    /// True when every section came back empty (nothing reachable)
    pub fn is_empty(&self) -> bool {
        self.for_you.is_empty() && self.latest.is_empty() && self.rank.is_empty()
    }
}

// =============================================================================
// Browse Filters
// =============================================================================

/// Genre filter for the classify endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    #[default]
    All,
    Romance,
    Action,
    Costume,
    Modern,
    Short,
}

impl Genre {
    /// Upstream genre id
    pub fn id(&self) -> u32 {
        match self {
            Genre::All => 1357,
            Genre::Romance => 1359,
            Genre::Costume => 1361,
            Genre::Action => 1363,
            Genre::Modern => 1365,
            Genre::Short => 1367,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Genre::All => "All",
            Genre::Romance => "Romance",
            Genre::Action => "Action",
            Genre::Costume => "Costume",
            Genre::Modern => "Modern",
            Genre::Short => "Short",
        };
        write!(f, "{}", label)
    }
}

/// Sort order for the classify endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Popular,
    Latest,
}

impl SortOrder {
    /// Upstream sort id
    pub fn id(&self) -> u32 {
        match self {
            SortOrder::Popular => 1,
            SortOrder::Latest => 2,
        }
    }
}

// =============================================================================
// Playback Models
// =============================================================================

/// Immutable key identifying one playback attempt
///
/// No upper bound is enforced on `episode_index`; an out-of-range request
/// surfaces as a resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackTarget {
    pub title_id: String,
    pub episode_index: usize,
}

impl PlaybackTarget {
    pub fn new(title_id: impl Into<String>, episode_index: usize) -> Self {
        Self {
            title_id: title_id.into(),
            episode_index,
        }
    }

    /// Target for the following episode of the same title
    pub fn next(&self) -> Self {
        Self::new(self.title_id.clone(), self.episode_index + 1)
    }

    /// Target for the preceding episode, if any
    pub fn previous(&self) -> Option<Self> {
        self.episode_index
            .checked_sub(1)
            .map(|index| Self::new(self.title_id.clone(), index))
    }
}

impl fmt::Display for PlaybackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.title_id, self.episode_index)
    }
}

/// A resolved, playable media URL
///
/// Held only by the active session; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaLocation(String);

impl MediaLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Format seconds as HH:MM:SS or MM:SS
pub fn format_seconds(seconds: f64) -> String {
    let total_secs = seconds.max(0.0) as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
