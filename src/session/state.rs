//! Session state machine
//!
//! ```text
//! Idle ──mic──▶ Listening ──result──▶ Processing ──speak──▶ Speaking ──done──▶ Idle
//!   ▲              │  │                    │
//!   └────mic/end───┘  └──────error─────────┴──▶ Error ──surfaced──▶ Idle
//! ```

use std::collections::HashSet;

use crate::voice::{RecognitionErrorKind, UtteranceId};

/// Status line while idle
pub const READY_STATUS: &str = "Ready to listen...";

/// Status line while recognition is running
pub const LISTENING_STATUS: &str = "Listening...";

/// Status line while a transcript is being handled
pub const PROCESSING_STATUS: &str = "Processing...";

/// Status line when the host has no recognizer
pub const UNAVAILABLE_STATUS: &str = "Speech recognition not available";

/// Current phase of the voice session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening,
    Processing,
    Speaking,
    Error,
}

/// What the driver should do with the recognizer after a mic toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicAction {
    Start,
    Stop,
    Ignored,
}

/// What became of a final recognition result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// Trimmed transcript to dispatch; the session is now `Processing`
    Accepted(String),
    /// Nothing was said; the session is back to `Idle`
    Empty,
    /// Arrived outside `Listening` and was dropped
    Discarded,
}

/// Voice session state with in-flight utterance tracking
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    recognition_available: bool,
    speaking: HashSet<UtteranceId>,
}

impl Session {
    /// Create an idle session
    #[must_use]
    pub fn new(recognition_available: bool) -> Self {
        Self {
            state: SessionState::Idle,
            recognition_available,
            speaking: HashSet::new(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the host offers speech recognition
    #[must_use]
    pub const fn recognition_available(&self) -> bool {
        self.recognition_available
    }

    /// Whether any utterance is still being synthesized
    #[must_use]
    pub fn is_synthesizing(&self) -> bool {
        !self.speaking.is_empty()
    }

    /// Status line for the initial state
    #[must_use]
    pub const fn initial_status(&self) -> &'static str {
        if self.recognition_available {
            READY_STATUS
        } else {
            UNAVAILABLE_STATUS
        }
    }

    /// Microphone button pressed
    ///
    /// At most one recognition session runs at a time: a second press while
    /// listening stops it without producing a transcript.
    pub fn toggle_mic(&mut self) -> MicAction {
        if !self.recognition_available {
            return MicAction::Ignored;
        }

        match self.state {
            SessionState::Listening => {
                self.state = SessionState::Idle;
                MicAction::Stop
            }
            SessionState::Idle | SessionState::Error if !self.is_synthesizing() => {
                self.state = SessionState::Listening;
                MicAction::Start
            }
            _ => MicAction::Ignored,
        }
    }

    /// Recognizer failed to start after a `Start` action
    pub fn start_failed(&mut self) {
        if self.state == SessionState::Listening {
            self.state = SessionState::Idle;
        }
    }

    /// Recognizer reported it is capturing audio
    #[must_use]
    pub fn on_started(&self) -> bool {
        self.state == SessionState::Listening
    }

    /// Final transcript arrived
    ///
    /// Results that arrive outside `Listening` (for example after the user
    /// toggled off) are discarded.
    pub fn on_result(&mut self, transcript: &str) -> TranscriptOutcome {
        if self.state != SessionState::Listening {
            tracing::debug!(state = ?self.state, "discarding late transcript");
            return TranscriptOutcome::Discarded;
        }

        let transcript = transcript.trim();
        if transcript.is_empty() {
            self.state = SessionState::Idle;
            return TranscriptOutcome::Empty;
        }

        self.state = SessionState::Processing;
        TranscriptOutcome::Accepted(transcript.to_string())
    }

    /// Recognition failed; returns the status line to surface
    pub fn on_error(&mut self, kind: &RecognitionErrorKind) -> Option<&'static str> {
        match self.state {
            SessionState::Listening | SessionState::Processing => {
                tracing::warn!(error = %kind, "speech recognition error");
                self.state = SessionState::Error;
                Some(kind.status_message())
            }
            _ => None,
        }
    }

    /// Leave `Error` after its status line was shown; no retry
    pub fn recover(&mut self) {
        if self.state == SessionState::Error {
            self.state = SessionState::Idle;
        }
    }

    /// Recognition ended; returns true when the session fell back to idle
    pub fn on_ended(&mut self) -> bool {
        if self.state == SessionState::Listening {
            self.state = SessionState::Idle;
            true
        } else {
            false
        }
    }

    /// An utterance was queued for synthesis
    pub fn begin_speaking(&mut self, id: UtteranceId) {
        self.speaking.insert(id);
        if self.state == SessionState::Processing {
            self.state = SessionState::Speaking;
        }
    }

    /// An utterance finished or failed; returns true when the session became idle
    pub fn finish_speaking(&mut self, id: UtteranceId) -> bool {
        self.speaking.remove(&id);
        if self.state == SessionState::Speaking && self.speaking.is_empty() {
            self.state = SessionState::Idle;
            true
        } else {
            false
        }
    }

    /// Transcript handling finished without queuing speech
    pub fn finish_processing(&mut self) {
        if self.state == SessionState::Processing {
            self.state = SessionState::Idle;
        }
    }
}
