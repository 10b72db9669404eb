//! Terminal UI components
//!
//! Built with ratatui. Keyboard-first, with mouse clicks as taps.

pub mod player;
pub mod theme;

pub use theme::Theme;
