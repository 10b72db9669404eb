//! Media element seam
//!
//! The session never talks to a concrete player. It issues
//! [`ElementCommand`]s and reacts to [`ElementEvent`]s delivered through an
//! [`ElementSink`], which stamps every event with the generation that was
//! current when the media was loaded.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::models::MediaLocation;
use crate::playback::controller::PlayerInput;

/// Commands the session issues to the media element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCommand {
    /// Start loading a resolved location
    Load(MediaLocation),
    Play,
    Pause,
    /// Relative seek in seconds
    SeekBy(f64),
    /// Rewind to position zero and load again
    Restart,
    /// Drop the current media
    Unload,
}

/// Signals the media element reports back
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    /// Media is ready to play; duration if known
    MetadataLoaded { duration: Option<f64> },
    /// Playback position update
    Progress { position: f64, duration: Option<f64> },
    /// End of media reached
    Ended,
    /// Format or stream failure after a location was loaded
    Error(String),
}

/// Errors from executing an element command
#[derive(Debug, Error)]
pub enum ElementError {
    #[error("{0} is not supported by this player")]
    Unsupported(&'static str),

    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),

    #[error("Failed to start player: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Player control failed: {0}")]
    Control(String),
}

impl ElementError {
    /// Whether the failure leaves nothing playing
    ///
    /// Control failures (a pause or seek that did not go through) are logged
    /// and otherwise ignored.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ElementError::NotFound(_) | ElementError::Spawn(_))
    }
}

/// Where a media element reports its events
#[derive(Debug, Clone)]
pub struct ElementSink {
    tx: UnboundedSender<PlayerInput>,
    generation: u64,
}

impl ElementSink {
    pub fn new(tx: UnboundedSender<PlayerInput>, generation: u64) -> Self {
        Self { tx, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report an event; silently dropped once the owning view is gone
    pub fn emit(&self, event: ElementEvent) {
        let _ = self.tx.send(PlayerInput::Element {
            generation: self.generation,
            event,
        });
    }
}

/// A playback surface driven by the session
#[async_trait]
pub trait MediaElement: Send {
    async fn apply(&mut self, command: ElementCommand, sink: &ElementSink)
        -> Result<(), ElementError>;
}
