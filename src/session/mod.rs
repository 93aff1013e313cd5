//! Voice session: state machine and the event-driven driver around it
//!
//! Everything that happens to a session arrives as an [`Event`] on a single
//! channel. The [`SessionDriver`] consumes them one at a time and never awaits
//! the backend itself: network calls run in spawned tasks that post their
//! outcome back, so timers and recognizer reports keep flowing while a
//! request is pending.

mod driver;
mod state;

use std::collections::BTreeMap;

use tokio::sync::mpsc;

pub use driver::{DriverParts, FEEDBACK_STATUS_TTL, SessionDriver, startup_greeting};
pub use state::{
    LISTENING_STATUS, MicAction, PROCESSING_STATUS, READY_STATUS, Session, SessionState,
    TranscriptOutcome, UNAVAILABLE_STATUS,
};

use crate::commands::{Reply, TimerRequest};
use crate::voice::SpeechEvent;

/// Input to the session driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Report from a speech adapter
    Speech(SpeechEvent),
    /// Microphone button pressed
    MicToggle,
    /// Feedback text submitted
    Feedback(String),
    /// A timer started by a command elapsed
    TimerElapsed(TimerRequest),
    /// Backend work for a transcript finished
    Completed(Completion),
    /// Feedback submission finished with this status line
    FeedbackSubmitted(&'static str),
    /// Clear the feedback status if no newer status replaced it
    ClearFeedbackStatus(u64),
    /// Stored preferences fetched at startup (empty when unavailable)
    PreferencesLoaded(BTreeMap<String, Option<String>>),
    /// Stop the session
    Shutdown,
}

/// Outcome of a backend call made for one transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Transcript sequence number the call was made for
    pub request: u64,
    pub reply: Reply,
    /// Fresh reminder list, when the backend returned one
    pub reminders: Option<Vec<String>>,
}

/// Sending half of the session channel
pub type EventSender = mpsc::UnboundedSender<Event>;

/// Receiving half of the session channel
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Create a session channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
