//! Playback backends
//!
//! - Player: mpv/VLC processes driven as media elements

pub mod player;

pub use player::{LocalPlayer, PlayerType};
