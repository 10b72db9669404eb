//! Response normalization
//!
//! The upstream backend wraps lists under varying keys and names the same
//! field differently between endpoints. Everything here is total: absent or
//! malformed data turns into defaults, never into an error.
//!
//! Field probing is table driven. Each canonical field has a [`FieldRule`]
//! listing the source keys to try in priority order and the fallback used
//! when none of them is present.

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::models::{CatalogItem, EpisodeRef, TitleDetail, PLACEHOLDER_COVER};

/// Wrapper keys probed for the list payload, in priority order
pub const LIST_KEYS: &[&str] = &[
    "list", "data", "items", "results", "ranking", "foryou", "new", "search",
];

/// Keys probed for a title's episode list, in priority order
pub const EPISODE_LIST_KEYS: &[&str] = &["chapters", "chapterList", "list", "data"];

/// How many times list discovery may descend into a nested `data` object
const MAX_WRAPPER_DEPTH: usize = 1;

// =============================================================================
// Rule Tables
// =============================================================================

/// What a field becomes when none of its source keys is present
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    /// Fixed text
    Text(&'static str),
    /// A fresh unique id with the given prefix
    Generated(&'static str),
    /// Numeric zero
    Zero,
    /// Left unset
    Absent,
}

/// Ordered source keys for one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub keys: &'static [&'static str],
    pub fallback: Fallback,
}

impl FieldRule {
    const fn new(keys: &'static [&'static str], fallback: Fallback) -> Self {
        Self { keys, fallback }
    }

    /// First present value among the rule's keys
    pub fn probe<'a>(&self, record: &'a Map<String, Value>) -> Option<&'a Value> {
        self.keys
            .iter()
            .find_map(|key| record.get(*key).filter(|v| is_present(v)))
    }

    /// First key whose value coerces to text, without applying the fallback
    ///
    /// Objects and arrays under an earlier key are skipped rather than
    /// ending the search.
    pub fn text(&self, record: &Map<String, Value>) -> Option<String> {
        self.keys
            .iter()
            .find_map(|key| record.get(*key).and_then(coerce_text))
    }

    /// Probe and coerce to text, applying the fallback
    pub fn text_or_fallback(&self, record: &Map<String, Value>) -> String {
        self.text(record).unwrap_or_else(|| match self.fallback {
            Fallback::Text(text) => text.to_string(),
            Fallback::Generated(prefix) => generate_id(prefix),
            Fallback::Zero => "0".to_string(),
            Fallback::Absent => String::new(),
        })
    }

    /// Probe and coerce to a non-negative number, 0 on absence or parse failure
    pub fn number(&self, record: &Map<String, Value>) -> f64 {
        self.probe(record).map(coerce_number).unwrap_or(0.0)
    }
}

/// Field rules for a catalog record
#[derive(Debug, Clone, Copy)]
pub struct ItemRules {
    pub id: FieldRule,
    pub name: FieldRule,
    pub cover: FieldRule,
    pub synopsis: FieldRule,
    pub latest_episode: FieldRule,
    pub score: FieldRule,
    pub tag: FieldRule,
    pub update_time: FieldRule,
}

/// Rules for entries of list endpoints (home sections, classify, search)
pub const ITEM_RULES: ItemRules = ItemRules {
    id: FieldRule::new(&["bookId", "book_id", "id", "vod_id"], Fallback::Generated("temp")),
    name: FieldRule::new(
        &["bookName", "book_name", "name", "title", "vod_name"],
        Fallback::Text("Untitled"),
    ),
    cover: FieldRule::new(
        &["cover", "img", "image", "thumb", "picture", "vod_pic"],
        Fallback::Text(PLACEHOLDER_COVER),
    ),
    synopsis: FieldRule::new(
        &["intro", "introduction", "desc", "description", "content", "vod_content"],
        Fallback::Text("No synopsis available."),
    ),
    latest_episode: FieldRule::new(
        &["latestChapter", "latest_chapter", "vod_remarks"],
        Fallback::Zero,
    ),
    score: FieldRule::new(&["score", "vod_score"], Fallback::Zero),
    tag: FieldRule::new(&["tag", "category", "type", "vod_class"], Fallback::Absent),
    update_time: FieldRule::new(
        &["updateTime", "update_time", "vod_time"],
        Fallback::Absent,
    ),
};

/// Rules for the chapters endpoint's title record
pub const DETAIL_RULES: ItemRules = ItemRules {
    id: FieldRule::new(&["bookId", "book_id", "id"], Fallback::Generated("temp")),
    name: FieldRule::new(
        &["bookName", "book_name", "title", "name"],
        Fallback::Text("Untitled"),
    ),
    cover: FieldRule::new(
        &["cover", "img", "thumb", "picture", "image"],
        Fallback::Text(PLACEHOLDER_COVER),
    ),
    synopsis: FieldRule::new(
        &["intro", "introduction", "brief", "desc", "description", "content"],
        Fallback::Text("No synopsis available."),
    ),
    // Falls back to the episode count, see `normalize_detail`
    latest_episode: FieldRule::new(&["latestChapter", "latest_chapter"], Fallback::Absent),
    score: FieldRule::new(&["score"], Fallback::Zero),
    tag: FieldRule::new(&["tag", "type", "category"], Fallback::Absent),
    update_time: FieldRule::new(&["updateTime", "update_time"], Fallback::Absent),
};

/// Field rules for an episode record
#[derive(Debug, Clone, Copy)]
pub struct EpisodeRules {
    pub id: FieldRule,
    pub name: FieldRule,
    pub restricted: FieldRule,
    pub update_time: FieldRule,
}

pub const EPISODE_RULES: EpisodeRules = EpisodeRules {
    id: FieldRule::new(&["chapterId", "chapter_id", "id"], Fallback::Generated("ep")),
    name: FieldRule::new(
        &["chapterName", "chapter_name", "name", "title"],
        Fallback::Absent,
    ),
    restricted: FieldRule::new(&["isVip", "is_vip", "isCharge"], Fallback::Absent),
    update_time: FieldRule::new(&["updateTime", "update_time"], Fallback::Absent),
};

/// Keys probed when a suggestion entry is an object instead of a string
const SUGGESTION_RULE: FieldRule = FieldRule::new(
    &["keyword", "bookName", "name", "title"],
    Fallback::Absent,
);

// =============================================================================
// List Extraction
// =============================================================================

/// Locate the list inside an arbitrarily wrapped payload
///
/// Returns an empty slice when no array can be found.
pub fn find_array(payload: &Value) -> &[Value] {
    find_array_within(payload, MAX_WRAPPER_DEPTH)
}

fn find_array_within(payload: &Value, depth: usize) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => {
            if let Some(items) = first_array(map, LIST_KEYS) {
                return items;
            }
            match map.get("data") {
                Some(inner @ Value::Object(_)) if depth > 0 => find_array_within(inner, depth - 1),
                _ => &[],
            }
        }
        _ => &[],
    }
}

/// Normalize a list payload into catalog items
///
/// One output item per discovered entry, in order. Corrupt entries become
/// placeholders instead of being dropped.
pub fn extract_list(payload: &Value) -> Vec<CatalogItem> {
    let entries = find_array(payload);
    debug!(count = entries.len(), "normalizing catalog list");
    entries.iter().map(normalize_item).collect()
}

/// Normalize a suggestion payload into plain strings
///
/// Entries that carry no usable text are skipped.
pub fn extract_strings(payload: &Value) -> Vec<String> {
    find_array(payload)
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => SUGGESTION_RULE.text(map),
            other if is_present(other) => coerce_text(other),
            _ => None,
        })
        .collect()
}

/// Normalize a single catalog record
pub fn normalize_item(entry: &Value) -> CatalogItem {
    let Some(record) = entry.as_object() else {
        return placeholder_item();
    };
    // Some endpoints wrap each record once more
    let record = match record.get("data") {
        Some(Value::Object(inner)) => inner,
        _ => record,
    };
    build_item(record, &ITEM_RULES)
}

fn build_item(record: &Map<String, Value>, rules: &ItemRules) -> CatalogItem {
    CatalogItem {
        id: rules.id.text_or_fallback(record),
        name: rules.name.text_or_fallback(record),
        cover: rules.cover.text_or_fallback(record),
        synopsis: rules.synopsis.text_or_fallback(record),
        latest_episode: rules.latest_episode.text_or_fallback(record),
        score: rules.score.number(record),
        tag: rules.tag.text_or_fallback(record),
        update_time: rules.update_time.text(record),
    }
}

/// Stand-in for a record that is not an object at all
fn placeholder_item() -> CatalogItem {
    CatalogItem {
        id: generate_id("err"),
        name: "Unknown".to_string(),
        cover: PLACEHOLDER_COVER.to_string(),
        synopsis: String::new(),
        latest_episode: "0".to_string(),
        score: 0.0,
        tag: String::new(),
        update_time: None,
    }
}

// =============================================================================
// Detail Extraction
// =============================================================================

/// Normalize a chapters payload into a title with its episode list
///
/// `requested_id` is used when the payload carries no id of its own; pass an
/// empty string to get a generated one instead.
pub fn normalize_detail(payload: &Value, requested_id: &str) -> TitleDetail {
    let body = match payload {
        Value::Object(map) => match map.get("data") {
            Some(inner @ (Value::Object(_) | Value::Array(_))) => inner,
            _ => payload,
        },
        _ => payload,
    };

    let empty = Map::new();
    let (record, episodes) = match body {
        Value::Array(items) => (&empty, items.as_slice()),
        Value::Object(map) => (map, first_array(map, EPISODE_LIST_KEYS).unwrap_or(&[])),
        _ => (&empty, &[][..]),
    };

    let episodes: Vec<EpisodeRef> = episodes
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_episode(index, entry))
        .collect();

    let mut item = build_item(record, &DETAIL_RULES);
    if DETAIL_RULES.id.text(record).is_none() && !requested_id.trim().is_empty() {
        item.id = requested_id.to_string();
    }
    if item.latest_episode.is_empty() {
        item.latest_episode = episodes.len().to_string();
    }

    debug!(id = %item.id, episodes = episodes.len(), "normalized title detail");
    TitleDetail { item, episodes }
}

/// Normalize one episode record; the index is always its list position
pub fn normalize_episode(index: usize, entry: &Value) -> EpisodeRef {
    let default_name = || format!("Episode {}", index + 1);
    match entry {
        Value::Object(record) => EpisodeRef {
            index,
            id: EPISODE_RULES.id.text_or_fallback(record),
            name: EPISODE_RULES.name.text(record).unwrap_or_else(default_name),
            restricted: EPISODE_RULES.restricted.probe(record).map(coerce_flag),
            update_time: EPISODE_RULES.update_time.text(record),
        },
        // A bare scalar is the episode id itself
        scalar => EpisodeRef {
            index,
            id: coerce_text(scalar).unwrap_or_else(|| generate_id("ep")),
            name: default_name(),
            restricted: None,
            update_time: None,
        },
    }
}

// =============================================================================
// Coercion Helpers
// =============================================================================

fn first_array<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a [Value]> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

/// Missing, null and blank strings all count as absent
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// String cast for identity and text fields
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric parse defaulting to 0; negative and non-finite values clamp to 0
fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0).max(0.0)
}

fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "yes"),
        _ => false,
    }
}

fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
