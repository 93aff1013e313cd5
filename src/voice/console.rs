//! Terminal speech adapters
//!
//! Typed lines stand in for recognized speech and spoken replies are printed.
//! An empty line toggles the microphone, `/feedback <text>` submits feedback
//! and `/quit` (or end of input) shuts the session down.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::speech::{SpeechEvent, SpeechRecognizer, SpeechSynthesizer, UtteranceId, Voice};
use crate::{Error, Result};
use crate::session::{Event, EventSender};

/// Recognizer fed by lines typed on the terminal
pub struct ConsoleRecognizer {
    events: EventSender,
    active: Arc<AtomicBool>,
}

impl ConsoleRecognizer {
    /// Create a recognizer posting to the session channel
    #[must_use]
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Line reader bound to this recognizer
    #[must_use]
    pub fn input(&self) -> ConsoleInput {
        ConsoleInput {
            events: self.events.clone(),
            active: Arc::clone(&self.active),
        }
    }
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn start(&mut self, language: &str) -> Result<()> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(Error::Voice("recognition already started".to_string()));
        }
        tracing::debug!(language, "console recognition started");
        let _ = self.events.send(Event::Speech(SpeechEvent::Started));
        Ok(())
    }

    fn stop(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            let _ = self.events.send(Event::Speech(SpeechEvent::Ended));
        }
    }
}

/// Reads terminal lines and turns them into session events
pub struct ConsoleInput {
    events: EventSender,
    active: Arc<AtomicBool>,
}

impl ConsoleInput {
    /// Read until end of input or `/quit`
    ///
    /// # Errors
    ///
    /// Returns error if reading from the input fails
    pub async fn run<R>(self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();

            let events = if line.is_empty() {
                vec![Event::MicToggle]
            } else if line == "/quit" || line == "/exit" {
                break;
            } else if let Some(text) = line.strip_prefix("/feedback") {
                vec![Event::Feedback(text.trim().to_string())]
            } else if self.active.swap(false, Ordering::SeqCst) {
                vec![
                    Event::Speech(SpeechEvent::Result(line.to_string())),
                    Event::Speech(SpeechEvent::Ended),
                ]
            } else {
                println!("(press Enter to start listening)");
                continue;
            };

            for event in events {
                if self.events.send(event).is_err() {
                    return Ok(());
                }
            }
        }

        let _ = self.events.send(Event::Shutdown);
        Ok(())
    }
}

/// Synthesizer that prints utterances
pub struct ConsoleSynthesizer {
    events: EventSender,
    next_id: u64,
}

impl ConsoleSynthesizer {
    /// Create a synthesizer posting to the session channel
    #[must_use]
    pub const fn new(events: EventSender) -> Self {
        Self { events, next_id: 0 }
    }
}

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: "Console".to_string(),
            lang: "en-US".to_string(),
        }]
    }

    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> UtteranceId {
        self.next_id += 1;
        let id = UtteranceId(self.next_id);

        let _ = self.events.send(Event::Speech(SpeechEvent::SpeakStarted(id)));
        let name = voice.map_or("Nova", |v| v.name.as_str());
        println!("🔊 [{name}] {text}");
        let _ = self.events.send(Event::Speech(SpeechEvent::SpeakEnded(id)));

        id
    }
}
