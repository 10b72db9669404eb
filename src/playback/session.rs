//! Playback session state machine
//!
//! One session is bound to one [`PlaybackTarget`] at a time. It performs no
//! I/O: every transition returns the [`Effect`]s the owner must carry out
//! (resolve, arm the retry timer, command the element, notify the UI).
//!
//! Asynchronous results come back tagged with the generation they were issued
//! under. The generation increases on every new resolution attempt, retarget
//! and close, so anything tagged with an older one is discarded.
//!
//! ```text
//! Loading ──ok──▶ Ready ──metadata──▶ Playing ◀──toggle──▶ Paused
//!    │ fail (retries left: stay Loading, retry after delay)     │
//!    ▼ fail (exhausted)                                         ▼ end
//!  Error ◀──element error── Ready/Playing/Paused    EpisodeComplete | Closed (auto-advance)
//! ```

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::resolver::ResolutionFailure;
use crate::models::{MediaLocation, PlaybackTarget};
use crate::playback::element::{ElementCommand, ElementEvent};

/// Automatic retries after a failed resolution
pub const MAX_AUTO_RETRIES: u32 = 2;

/// Delay before each automatic retry
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

// =============================================================================
// States and Effects
// =============================================================================

/// Why a session sits in the error state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PlaybackError {
    /// No playable location could be resolved
    Resolution,
    /// The media element failed after a location was loaded
    Stream(String),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Resolution => write!(
                f,
                "Unable to load this episode. The server might be busy or the resource is missing."
            ),
            PlaybackError::Stream(_) => write!(
                f,
                "The video stream was interrupted or the format is not supported."
            ),
        }
    }
}

/// Session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Resolution in flight, or waiting to retry
    Loading,
    /// Location handed to the element, waiting for its metadata
    Ready,
    Playing,
    Paused,
    /// Terminal until the user retries, advances or closes
    Error(PlaybackError),
    /// Episode finished with auto-advance off
    EpisodeComplete,
    /// Session ended; only a retarget revives it
    Closed,
}

impl SessionState {
    /// States in which the control overlay must stay hidden
    pub fn suppresses_overlay(&self) -> bool {
        matches!(self, SessionState::Error(_) | SessionState::EpisodeComplete)
    }

    /// Media loaded and metadata known
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Playing | SessionState::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Loading => write!(f, "Buffering..."),
            SessionState::Ready => write!(f, "Ready"),
            SessionState::Playing => write!(f, "Playing"),
            SessionState::Paused => write!(f, "Paused"),
            SessionState::Error(_) => write!(f, "Playback Error"),
            SessionState::EpisodeComplete => write!(f, "Episode Finished"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start resolving `target`; report back under `generation`
    Resolve {
        generation: u64,
        target: PlaybackTarget,
    },
    /// Arm the retry timer, replacing any pending one
    ScheduleRetry { generation: u64, delay: Duration },
    /// Disarm the retry timer
    CancelRetry,
    /// Command the media element
    Element(ElementCommand),
    /// Tell the owner the state changed
    StateChanged(SessionState),
    /// Ask the owner to move on to this target
    AdvanceRequested(PlaybackTarget),
}

/// Bounded automatic retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_AUTO_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Playback session for one target
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    target: PlaybackTarget,
    state: SessionState,
    generation: u64,
    retry_count: u32,
    retry_pending: bool,
    auto_advance: bool,
    policy: RetryPolicy,
    location: Option<MediaLocation>,
    position: f64,
    duration: Option<f64>,
}

impl PlaybackSession {
    /// Open a session; the returned effects start the first resolution
    pub fn open(target: PlaybackTarget, auto_advance: bool) -> (Self, Vec<Effect>) {
        Self::with_policy(target, auto_advance, RetryPolicy::default())
    }

    /// Open a session with a custom retry policy
    pub fn with_policy(
        target: PlaybackTarget,
        auto_advance: bool,
        policy: RetryPolicy,
    ) -> (Self, Vec<Effect>) {
        let session = Self {
            target: target.clone(),
            state: SessionState::Loading,
            generation: 1,
            retry_count: 0,
            retry_pending: false,
            auto_advance,
            policy,
            location: None,
            position: 0.0,
            duration: None,
        };
        info!(episode = %target, "opening playback session");
        let effects = vec![
            Effect::StateChanged(SessionState::Loading),
            Effect::Resolve {
                generation: session.generation,
                target,
            },
        ];
        (session, effects)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn target(&self) -> &PlaybackTarget {
        &self.target
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Waiting out the retry delay
    pub fn is_retry_pending(&self) -> bool {
        self.retry_pending
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn location(&self) -> Option<&MediaLocation> {
        self.location.as_ref()
    }

    /// Last reported position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Whether a result tagged with `generation` must be discarded
    pub fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation || self.state == SessionState::Closed
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        debug!(enabled, "auto-advance preference changed");
        self.auto_advance = enabled;
    }

    // -------------------------------------------------------------------------
    // Owner-driven transitions
    // -------------------------------------------------------------------------

    /// Bind the session to a new target, superseding anything in flight
    pub fn retarget(&mut self, target: PlaybackTarget) -> Vec<Effect> {
        info!(from = %self.target, to = %target, "retargeting playback session");
        self.target = target;
        self.retry_count = 0;
        self.start_attempt(vec![Effect::CancelRetry, Effect::Element(ElementCommand::Unload)])
    }

    /// End the session; pending timers are cancelled and late results ignored
    pub fn close(&mut self) -> Vec<Effect> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }
        info!(episode = %self.target, "closing playback session");
        self.generation += 1;
        self.retry_pending = false;
        self.location = None;
        vec![
            Effect::CancelRetry,
            Effect::Element(ElementCommand::Unload),
            self.transition(SessionState::Closed),
        ]
    }

    // -------------------------------------------------------------------------
    // Asynchronous results
    // -------------------------------------------------------------------------

    /// Apply the outcome of a resolution issued under `generation`
    pub fn on_resolved(
        &mut self,
        generation: u64,
        result: Result<MediaLocation, ResolutionFailure>,
    ) -> Vec<Effect> {
        if self.is_stale(generation) || self.state != SessionState::Loading {
            debug!(generation, current = self.generation, "discarding stale resolution");
            return Vec::new();
        }

        match result {
            Ok(location) => {
                self.location = Some(location.clone());
                vec![
                    self.transition(SessionState::Ready),
                    Effect::Element(ElementCommand::Load(location)),
                ]
            }
            Err(failure) if self.retry_count < self.policy.max_retries => {
                self.retry_count += 1;
                self.retry_pending = true;
                warn!(
                    episode = %failure.target,
                    retry = self.retry_count,
                    max = self.policy.max_retries,
                    "resolution failed, scheduling retry"
                );
                vec![Effect::ScheduleRetry {
                    generation: self.generation,
                    delay: self.policy.delay,
                }]
            }
            Err(failure) => {
                warn!(episode = %failure.target, "resolution failed, retries exhausted");
                vec![self.transition(SessionState::Error(PlaybackError::Resolution))]
            }
        }
    }

    /// The retry delay armed under `generation` has elapsed
    pub fn on_retry_elapsed(&mut self, generation: u64) -> Vec<Effect> {
        if self.is_stale(generation) || !self.retry_pending {
            debug!(generation, "discarding stale retry timer");
            return Vec::new();
        }
        self.retry_pending = false;
        self.generation += 1;
        vec![Effect::Resolve {
            generation: self.generation,
            target: self.target.clone(),
        }]
    }

    /// React to a media element event reported under `generation`
    pub fn on_element(&mut self, generation: u64, event: ElementEvent) -> Vec<Effect> {
        if self.is_stale(generation) {
            debug!(generation, ?event, "discarding stale element event");
            return Vec::new();
        }

        match (&self.state, event) {
            (SessionState::Ready, ElementEvent::MetadataLoaded { duration }) => {
                self.duration = duration;
                vec![
                    Effect::Element(ElementCommand::Play),
                    self.transition(SessionState::Playing),
                ]
            }
            (_, ElementEvent::Progress { position, duration }) => {
                self.position = position;
                if duration.is_some() {
                    self.duration = duration;
                }
                Vec::new()
            }
            (SessionState::Playing | SessionState::Paused, ElementEvent::Ended) => {
                if self.auto_advance {
                    let next = self.target.next();
                    self.generation += 1;
                    vec![
                        self.transition(SessionState::Closed),
                        Effect::AdvanceRequested(next),
                    ]
                } else {
                    vec![self.transition(SessionState::EpisodeComplete)]
                }
            }
            (
                SessionState::Ready | SessionState::Playing | SessionState::Paused,
                ElementEvent::Error(message),
            ) => {
                warn!(episode = %self.target, %message, "media element reported an error");
                vec![self.transition(SessionState::Error(PlaybackError::Stream(message)))]
            }
            (state, event) => {
                debug!(?state, ?event, "element event ignored in this state");
                Vec::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // User-driven transitions
    // -------------------------------------------------------------------------

    /// Play/pause toggle
    pub fn toggle(&mut self) -> Vec<Effect> {
        match self.state {
            SessionState::Playing => vec![
                Effect::Element(ElementCommand::Pause),
                self.transition(SessionState::Paused),
            ],
            SessionState::Paused => vec![
                Effect::Element(ElementCommand::Play),
                self.transition(SessionState::Playing),
            ],
            _ => Vec::new(),
        }
    }

    /// Relative seek, only while media is active
    pub fn seek_by(&mut self, seconds: f64) -> Vec<Effect> {
        if !self.state.is_active() {
            return Vec::new();
        }
        self.position = (self.position + seconds).max(0.0);
        vec![Effect::Element(ElementCommand::SeekBy(seconds))]
    }

    /// Replay the finished episode from position zero
    pub fn replay(&mut self) -> Vec<Effect> {
        if self.state != SessionState::EpisodeComplete {
            return Vec::new();
        }
        self.position = 0.0;
        vec![
            Effect::Element(ElementCommand::Restart),
            self.transition(SessionState::Ready),
        ]
    }

    /// Manual retry from the error screen
    ///
    /// Grants one fresh attempt; automatic retries stay as spent as they were.
    pub fn retry(&mut self) -> Vec<Effect> {
        if !matches!(self.state, SessionState::Error(_)) {
            return Vec::new();
        }
        info!(episode = %self.target, "manual retry");
        self.start_attempt(vec![Effect::Element(ElementCommand::Unload)])
    }

    /// Ask the owner for the next episode
    pub fn next(&mut self) -> Vec<Effect> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }
        vec![Effect::AdvanceRequested(self.target.next())]
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Enter Loading under a fresh generation and request resolution
    fn start_attempt(&mut self, mut effects: Vec<Effect>) -> Vec<Effect> {
        self.generation += 1;
        self.retry_pending = false;
        self.location = None;
        self.position = 0.0;
        self.duration = None;
        effects.push(self.transition(SessionState::Loading));
        effects.push(Effect::Resolve {
            generation: self.generation,
            target: self.target.clone(),
        });
        effects
    }

    fn transition(&mut self, next: SessionState) -> Effect {
        debug!(from = ?self.state, to = ?next, episode = %self.target, "session transition");
        self.state = next.clone();
        Effect::StateChanged(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> PlaybackTarget {
        PlaybackTarget::new("41000102", 0)
    }

    fn failure() -> Result<MediaLocation, ResolutionFailure> {
        Err(ResolutionFailure::new(&target()))
    }

    fn ok() -> Result<MediaLocation, ResolutionFailure> {
        Ok(MediaLocation::new("https://x/video.mp4"))
    }

    fn playing(auto_advance: bool) -> PlaybackSession {
        let (mut session, _) = PlaybackSession::open(target(), auto_advance);
        let gen = session.generation();
        session.on_resolved(gen, ok());
        session.on_element(gen, ElementEvent::MetadataLoaded { duration: Some(90.0) });
        assert_eq!(session.state(), &SessionState::Playing);
        session
    }

    #[test]
    fn test_open_requests_resolution() {
        let (session, effects) = PlaybackSession::open(target(), true);
        assert_eq!(session.state(), &SessionState::Loading);
        assert!(effects.contains(&Effect::Resolve {
            generation: session.generation(),
            target: target(),
        }));
    }

    #[test]
    fn test_success_loads_element() {
        let (mut session, _) = PlaybackSession::open(target(), true);
        let effects = session.on_resolved(session.generation(), ok());
        assert_eq!(session.state(), &SessionState::Ready);
        assert!(effects.contains(&Effect::Element(ElementCommand::Load(MediaLocation::new(
            "https://x/video.mp4"
        )))));
    }

    #[test]
    fn test_failure_schedules_retry_and_stays_loading() {
        let (mut session, _) = PlaybackSession::open(target(), true);
        let effects = session.on_resolved(session.generation(), failure());
        assert_eq!(session.state(), &SessionState::Loading);
        assert_eq!(
            effects,
            vec![Effect::ScheduleRetry {
                generation: session.generation(),
                delay: RETRY_DELAY,
            }]
        );
        assert!(session.is_retry_pending());
    }

    #[test]
    fn test_retry_elapsed_bumps_generation() {
        let (mut session, _) = PlaybackSession::open(target(), true);
        let first = session.generation();
        session.on_resolved(first, failure());
        let effects = session.on_retry_elapsed(first);
        assert_eq!(session.generation(), first + 1);
        assert_eq!(
            effects,
            vec![Effect::Resolve {
                generation: first + 1,
                target: target(),
            }]
        );
        // A second firing of the same timer is ignored
        assert!(session.on_retry_elapsed(first).is_empty());
    }

    #[test]
    fn test_toggle_only_when_active() {
        let (mut session, _) = PlaybackSession::open(target(), true);
        assert!(session.toggle().is_empty());

        let mut session = playing(true);
        assert!(session
            .toggle()
            .contains(&Effect::Element(ElementCommand::Pause)));
        assert_eq!(session.state(), &SessionState::Paused);
        session.toggle();
        assert_eq!(session.state(), &SessionState::Playing);
    }

    #[test]
    fn test_element_error_is_terminal() {
        let mut session = playing(true);
        let gen = session.generation();
        let effects = session.on_element(gen, ElementEvent::Error("decode".into()));
        assert_eq!(
            session.state(),
            &SessionState::Error(PlaybackError::Stream("decode".into()))
        );
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::ScheduleRetry { .. })));
    }

    #[test]
    fn test_close_discards_everything() {
        let (mut session, _) = PlaybackSession::open(target(), true);
        let gen = session.generation();
        session.close();
        assert!(session.on_resolved(gen, ok()).is_empty());
        assert_eq!(session.state(), &SessionState::Closed);
        assert!(session.close().is_empty());
    }

    #[test]
    fn test_progress_tracks_position() {
        let mut session = playing(false);
        let gen = session.generation();
        session.on_element(
            gen,
            ElementEvent::Progress {
                position: 12.5,
                duration: None,
            },
        );
        assert_eq!(session.position(), 12.5);
        assert_eq!(session.duration(), Some(90.0));
        session.seek_by(-20.0);
        assert_eq!(session.position(), 0.0);
    }

    #[test]
    fn test_error_messages() {
        assert!(PlaybackError::Resolution.to_string().contains("Unable to load"));
        assert!(PlaybackError::Stream("x".into())
            .to_string()
            .contains("interrupted"));
    }
}
