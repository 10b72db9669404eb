//! Resilient playback
//!
//! - `session`: the state machine, free of I/O
//! - `controller`: runs a session against a resolver and a media element
//! - `timer`, `overlay`, `gesture`: the pieces the controller wires together

pub mod controller;
pub mod element;
pub mod gesture;
pub mod overlay;
pub mod session;
pub mod timer;

pub use controller::{PlayerController, PlayerEvent, PlayerInput};
pub use element::{ElementCommand, ElementError, ElementEvent, ElementSink, MediaElement};
pub use gesture::{GestureInterpreter, SeekZone, Tap};
pub use overlay::Overlay;
pub use session::{Effect, PlaybackError, PlaybackSession, SessionState};
