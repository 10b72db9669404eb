//! DramaTUI - short dramas in the terminal
//!
//! Browse a short-drama catalog and watch episodes in mpv or VLC, with
//! bounded automatic retry, auto-advance and tap-to-seek.
//!
//! # Modules
//!
//! - `models` - Catalog items, episodes, playback targets
//! - `api` - Backend client, response normalizer, media resolver
//! - `playback` - Playback session, controller, timers, gestures
//! - `stream` - Local player processes as media elements
//! - `app` / `ui` / `tui` - Watch screen
//! - `cli` / `commands` - Scriptable command line

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod playback;
pub mod stream;
pub mod tui;
pub mod ui;

// Re-export commonly used types
pub use models::{
    CatalogItem, EpisodeRef, Genre, HomeFeed, MediaLocation, PlaybackTarget, SortOrder,
    TitleDetail,
};

pub use api::{DramaClient, MediaResolver, Resolve, ResolutionFailure};
pub use app::WatchApp;
pub use playback::{PlaybackSession, PlayerController, SessionState};
