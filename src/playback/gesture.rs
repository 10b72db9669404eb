//! Tap gesture interpretation
//!
//! Two taps within [`DOUBLE_TAP_WINDOW`] form a double-tap. Its horizontal
//! position picks a [`SeekZone`]: left third rewinds, right third skips ahead,
//! the middle does nothing. Every tap, double or not, also reveals the overlay;
//! that part is handled by the controller.

use std::time::{Duration, Instant};

/// Maximum gap between the two taps of a double-tap
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// Seconds skipped by a double-tap in a side zone
pub const SEEK_STEP_SECS: f64 = 10.0;

/// Horizontal thirds of the playback surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekZone {
    Backward,
    Center,
    Forward,
}

impl SeekZone {
    /// Zone for a tap at `x` on a surface `width` wide
    pub fn of(x: f64, width: f64) -> Self {
        if width <= 0.0 {
            return SeekZone::Center;
        }
        let third = width / 3.0;
        if x < third {
            SeekZone::Backward
        } else if x > third * 2.0 {
            SeekZone::Forward
        } else {
            SeekZone::Center
        }
    }

    /// Relative seek for a double-tap in this zone, if any
    pub fn offset(&self) -> Option<f64> {
        match self {
            SeekZone::Backward => Some(-SEEK_STEP_SECS),
            SeekZone::Center => None,
            SeekZone::Forward => Some(SEEK_STEP_SECS),
        }
    }
}

/// A single tap on the playback surface
#[derive(Debug, Clone, Copy)]
pub struct Tap {
    pub at: Instant,
    pub x: f64,
    pub width: f64,
}

impl Tap {
    pub fn new(at: Instant, x: f64, width: f64) -> Self {
        Self { at, x, width }
    }
}

/// Pairs taps into double-taps
#[derive(Debug, Default)]
pub struct GestureInterpreter {
    last_tap: Option<Instant>,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a tap; returns the zone when it completes a double-tap
    ///
    /// Every tap becomes the reference for the next one, so rapid repeated
    /// tapping keeps seeking.
    pub fn on_tap(&mut self, tap: Tap) -> Option<SeekZone> {
        let paired = self
            .last_tap
            .replace(tap.at)
            .is_some_and(|previous| tap.at.saturating_duration_since(previous) <= DOUBLE_TAP_WINDOW);
        paired.then(|| SeekZone::of(tap.x, tap.width))
    }

    /// Forget any half-finished double-tap
    pub fn reset(&mut self) {
        self.last_tap = None;
    }
}
