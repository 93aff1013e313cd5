//! Speech adapters
//!
//! Recognition and synthesis are host capabilities behind the
//! [`SpeechRecognizer`] and [`SpeechSynthesizer`] traits. The console
//! adapters drive a session from a terminal.

mod console;
mod speech;

pub use console::{ConsoleInput, ConsoleRecognizer, ConsoleSynthesizer};
pub use speech::{
    AUDIO_CAPTURE_STATUS, NO_SPEECH_STATUS, NOT_ALLOWED_STATUS, RECOGNITION_ERROR_STATUS,
    RecognitionErrorKind, SpeechEvent, SpeechRecognizer, SpeechSynthesizer, UtteranceId, Voice,
    select_voice,
};
