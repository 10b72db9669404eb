//! Control overlay visibility
//!
//! The overlay shows on any tap and hides [`AUTO_HIDE_DELAY`] after the most
//! recent one. It also comes up by itself when playback starts and when a
//! terminal prompt clears. While the session sits in Error or EpisodeComplete
//! the dedicated prompt replaces it, so taps do not reveal it and no hide is
//! pending.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::playback::controller::PlayerInput;
use crate::playback::session::SessionState;
use crate::playback::timer::ScopedTimer;

/// Time the overlay stays up after the last interaction
pub const AUTO_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Overlay visibility plus its auto-hide timer
#[derive(Debug)]
pub struct Overlay {
    visible: bool,
    suppressed: bool,
    active: bool,
    token: u64,
    timer: ScopedTimer<PlayerInput>,
}

impl Overlay {
    pub fn new(tx: UnboundedSender<PlayerInput>) -> Self {
        Self {
            visible: false,
            suppressed: false,
            active: false,
            token: 0,
            timer: ScopedTimer::new(tx),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a hide is armed
    pub fn is_hide_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Show the overlay and restart the hide countdown
    ///
    /// Returns false when a terminal prompt is up and the overlay stays hidden.
    pub fn reveal(&mut self) -> bool {
        if self.suppressed {
            return false;
        }
        self.visible = true;
        self.token += 1;
        self.timer
            .schedule(AUTO_HIDE_DELAY, PlayerInput::HideOverlay { token: self.token });
        trace!(token = self.token, "overlay revealed");
        true
    }

    /// The hide countdown identified by `token` elapsed
    pub fn on_hide(&mut self, token: u64) {
        if token == self.token {
            self.visible = false;
        }
    }

    /// Follow the session into and out of its terminal prompts
    pub fn on_session_state(&mut self, state: &SessionState) {
        let was_suppressed = self.suppressed;
        let was_active = self.active;
        self.suppressed = state.suppresses_overlay();
        self.active = state.is_active();

        let starting = *state == SessionState::Playing && !was_active;
        let prompt_cleared = was_suppressed && *state != SessionState::Closed;
        if self.suppressed {
            self.hide();
        } else if starting || prompt_cleared {
            self.reveal();
        }
    }

    /// Hide now and drop any pending countdown
    pub fn hide(&mut self) {
        self.visible = false;
        self.token += 1;
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::session::PlaybackError;
    use tokio::sync::mpsc;

    fn deliver(overlay: &mut Overlay, rx: &mut mpsc::UnboundedReceiver<PlayerInput>) {
        while let Ok(input) = rx.try_recv() {
            if let PlayerInput::HideOverlay { token } = input {
                overlay.on_hide(token);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hides_three_seconds_after_last_tap() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut overlay = Overlay::new(tx);

        overlay.reveal();
        tokio::time::sleep(Duration::from_secs(2)).await;
        overlay.reveal();
        tokio::time::sleep(Duration::from_millis(2900)).await;
        deliver(&mut overlay, &mut rx);
        assert!(overlay.is_visible());

        tokio::time::sleep(Duration::from_millis(200)).await;
        deliver(&mut overlay, &mut rx);
        assert!(!overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_state_suppresses() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut overlay = Overlay::new(tx);

        overlay.reveal();
        overlay.on_session_state(&SessionState::Error(PlaybackError::Resolution));
        assert!(!overlay.is_visible());
        assert!(!overlay.is_hide_pending());
        assert!(!overlay.reveal());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        overlay.on_session_state(&SessionState::Loading);
        assert!(overlay.is_visible(), "Leaving the prompt brings the controls back");
        assert!(overlay.is_hide_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shows_when_playback_starts() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut overlay = Overlay::new(tx);

        overlay.on_session_state(&SessionState::Loading);
        overlay.on_session_state(&SessionState::Ready);
        assert!(!overlay.is_visible());

        overlay.on_session_state(&SessionState::Playing);
        assert!(overlay.is_visible());

        // Pausing and resuming is not a new start
        tokio::time::sleep(AUTO_HIDE_DELAY + Duration::from_millis(100)).await;
        deliver(&mut overlay, &mut rx);
        overlay.on_session_state(&SessionState::Paused);
        overlay.on_session_state(&SessionState::Playing);
        assert!(!overlay.is_visible());

        overlay.on_session_state(&SessionState::Closed);
        assert!(!overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_token_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut overlay = Overlay::new(tx);
        overlay.reveal();
        overlay.reveal();
        overlay.on_hide(1);
        assert!(overlay.is_visible());
        overlay.on_hide(2);
        assert!(!overlay.is_visible());
    }
}
