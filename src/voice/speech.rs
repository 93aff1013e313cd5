//! Speech recognition and synthesis adapter contracts
//!
//! Adapters are fire-and-forget: `start`, `stop` and `speak` return at once and
//! report progress later as [`SpeechEvent`]s on the session event channel.

use std::fmt;

use crate::Result;

/// Status line for a recognition failure with no speech
pub const NO_SPEECH_STATUS: &str = "No speech detected. Please try again.";

/// Status line when the microphone cannot be captured
pub const AUDIO_CAPTURE_STATUS: &str = "Microphone not available.";

/// Status line when microphone permission was refused
pub const NOT_ALLOWED_STATUS: &str = "Microphone permission denied.";

/// Status line for any other recognition failure
pub const RECOGNITION_ERROR_STATUS: &str = "Voice recognition error. Please try again.";

/// Why recognition failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    NoSpeech,
    AudioCapture,
    NotAllowed,
    Other(String),
}

impl RecognitionErrorKind {
    /// Map a host error code (`no-speech`, `audio-capture`, `not-allowed`, ...)
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" | "service-not-allowed" => Self::NotAllowed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Status line shown to the user
    #[must_use]
    pub const fn status_message(&self) -> &'static str {
        match self {
            Self::NoSpeech => NO_SPEECH_STATUS,
            Self::AudioCapture => AUDIO_CAPTURE_STATUS,
            Self::NotAllowed => NOT_ALLOWED_STATUS,
            Self::Other(_) => RECOGNITION_ERROR_STATUS,
        }
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSpeech => f.write_str("no-speech"),
            Self::AudioCapture => f.write_str("audio-capture"),
            Self::NotAllowed => f.write_str("not-allowed"),
            Self::Other(code) => f.write_str(code),
        }
    }
}

/// Handle for one queued utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

/// Event reported by a speech adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Recognition began capturing audio
    Started,
    /// A final transcript (first alternative only)
    Result(String),
    /// Recognition failed
    Error(RecognitionErrorKind),
    /// Recognition stopped, with or without a result
    Ended,
    /// Synthesis of an utterance began
    SpeakStarted(UtteranceId),
    /// Synthesis of an utterance finished
    SpeakEnded(UtteranceId),
    /// Synthesis of an utterance failed
    SpeakFailed(UtteranceId),
}

/// A synthesis voice offered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

/// Speech-to-text adapter
pub trait SpeechRecognizer: Send + Sync {
    /// Whether recognition is supported at all on this host
    fn is_available(&self) -> bool {
        true
    }

    /// Begin a single recognition session (interim results disabled)
    ///
    /// # Errors
    ///
    /// Returns error if the host refuses to start recognition
    fn start(&mut self, language: &str) -> Result<()>;

    /// Stop the current recognition session, if any
    fn stop(&mut self);
}

/// Text-to-speech adapter
pub trait SpeechSynthesizer: Send + Sync {
    /// Voices the host can speak with
    fn voices(&self) -> Vec<Voice>;

    /// Queue an utterance; completion is reported as a [`SpeechEvent`]
    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> UtteranceId;
}

/// Pick the first voice whose name contains a preferred name, else the first voice
#[must_use]
pub fn select_voice(voices: &[Voice], preferred: &[String]) -> Option<Voice> {
    preferred
        .iter()
        .find_map(|want| voices.iter().find(|v| v.name.contains(want.as_str())))
        .or_else(|| voices.first())
        .cloned()
}
