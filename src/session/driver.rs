//! Session driver: executes dispatched actions and owns all session state

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;

use super::state::{PROCESSING_STATUS, READY_STATUS, Session, TranscriptOutcome};
use super::{
    Completion, Event, EventReceiver, EventSender, LISTENING_STATUS, MicAction, SessionState,
    UNAVAILABLE_STATUS,
};
use crate::client::{AssistantBackend, QueryReply};
use crate::commands::{Action, Dispatcher, Reply, TimerRequest};
use crate::config::VoiceConfig;
use crate::host::{UiSink, UrlOpener};
use crate::voice::{
    RECOGNITION_ERROR_STATUS, SpeechEvent, SpeechRecognizer, SpeechSynthesizer, UtteranceId,
    Voice, select_voice,
};
use crate::Error;

/// How long a feedback status stays visible
pub const FEEDBACK_STATUS_TTL: Duration = Duration::from_secs(5);

const TIMER_COMPLETED_SUFFIX: &str = "\n⏰ Timer completed!";
const REMINDER_SAVE_FAILED: &str = "I couldn't save your reminder. Please try again later.";
const REMINDER_LIST_FAILED: &str = "I couldn't retrieve your reminders. Please try again later.";
const NO_REMINDERS: &str = "You have no reminders.";
const WEB_SEARCH_SPOKEN: &str = "I couldn't find an answer. Let me search the internet for you.";
const FEEDBACK_THANKS: &str = "Thank you for your feedback!";
const FEEDBACK_EMPTY: &str = "Please enter feedback before submitting.";
const FEEDBACK_FAILED: &str = "Failed to submit feedback. Please try again.";
const RECOGNITION_UNAVAILABLE_SPOKEN: &str =
    "Sorry, speech recognition is not available on this device.";
const START_FAILED_SPOKEN: &str =
    "Sorry, I could not start listening. Please check your microphone settings.";

/// Greeting spoken once the session is up, by local hour of day
#[must_use]
pub const fn startup_greeting(hour: u32) -> &'static str {
    match hour {
        0..12 => "Good Morning! I'm Nova, your AI assistant. How can I help you today?",
        12..16 => "Good afternoon! Ready to assist you with anything?",
        _ => "Good evening! What can I do for you tonight?",
    }
}

/// Collaborators a driver needs
pub struct DriverParts {
    pub dispatcher: Dispatcher,
    pub backend: Arc<dyn AssistantBackend>,
    pub ui: Arc<dyn UiSink>,
    pub opener: Arc<dyn UrlOpener>,
    pub recognizer: Box<dyn SpeechRecognizer>,
    pub synthesizer: Box<dyn SpeechSynthesizer>,
}

/// Keeps the loading indicator on until dropped
struct LoadingGuard(Arc<dyn UiSink>);

impl LoadingGuard {
    fn new(ui: Arc<dyn UiSink>) -> Self {
        ui.set_loading(true);
        Self(ui)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}

/// Backend work a transcript can ask for
enum BackendCall {
    AddReminder(String),
    ListReminders,
    Query(String),
}

impl BackendCall {
    async fn run(self, backend: &dyn AssistantBackend) -> (Reply, Option<Vec<String>>) {
        match self {
            Self::AddReminder(text) => match backend.add_reminder(&text).await {
                Ok(reminders) => (
                    Reply::new(format!("Reminder added: {text}"), format!("Reminder set: {text}")),
                    Some(reminders),
                ),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to save reminder");
                    (Reply::same(REMINDER_SAVE_FAILED), None)
                }
            },
            Self::ListReminders => match backend.list_reminders().await {
                Ok(reminders) if reminders.is_empty() => {
                    (Reply::new(NO_REMINDERS, "No reminders set."), Some(reminders))
                }
                Ok(reminders) => {
                    let joined = reminders.join(", ");
                    let reply = Reply::new(
                        format!("Your reminders are: {joined}"),
                        format!("Your reminders: {joined}"),
                    );
                    (reply, Some(reminders))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to list reminders");
                    (Reply::same(REMINDER_LIST_FAILED), None)
                }
            },
            Self::Query(text) => match backend.query(&text).await {
                QueryReply::Answer(answer) => (Reply::same(answer), None),
                QueryReply::WebSearch { query, .. } => (
                    Reply::new(
                        WEB_SEARCH_SPOKEN,
                        format!("I'm not sure about that. Searching the web for: {query}"),
                    ),
                    None,
                ),
            },
        }
    }
}

/// Owns the session state and reacts to [`Event`]s
pub struct SessionDriver {
    session: Session,
    dispatcher: Dispatcher,
    backend: Arc<dyn AssistantBackend>,
    ui: Arc<dyn UiSink>,
    opener: Arc<dyn UrlOpener>,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    language: String,
    preferred_voices: Vec<String>,
    voice: Option<Voice>,
    reminders: Vec<String>,
    /// Sequence number of the latest accepted transcript
    request: u64,
    loading: Option<LoadingGuard>,
    greeted: bool,
    feedback_generation: u64,
    events_tx: EventSender,
    events_rx: EventReceiver,
}

impl SessionDriver {
    /// Create a driver reading from `events`
    #[must_use]
    pub fn new(parts: DriverParts, voice: &VoiceConfig, events: (EventSender, EventReceiver)) -> Self {
        let session = Session::new(parts.recognizer.is_available());
        let selected = select_voice(&parts.synthesizer.voices(), &voice.preferred_voices);
        let (events_tx, events_rx) = events;

        Self {
            session,
            dispatcher: parts.dispatcher,
            backend: parts.backend,
            ui: parts.ui,
            opener: parts.opener,
            recognizer: parts.recognizer,
            synthesizer: parts.synthesizer,
            language: voice.language.clone(),
            preferred_voices: voice.preferred_voices.clone(),
            voice: selected,
            reminders: Vec::new(),
            request: 0,
            loading: None,
            greeted: false,
            feedback_generation: 0,
            events_tx,
            events_rx,
        }
    }

    /// Sender for posting events to this driver
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.events_tx.clone()
    }

    /// Current session state
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Reminders from the last successful backend call
    #[must_use]
    pub fn reminders(&self) -> &[String] {
        &self.reminders
    }

    /// Recognition language in use
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Process events until shutdown
    pub async fn run(mut self) {
        self.ui.set_status(self.session.initial_status());
        self.load_preferences();
        tracing::info!(language = %self.language, "voice session ready");

        while self.step().await {}

        self.recognizer.stop();
        tracing::info!("voice session stopped");
    }

    /// Wait for the next event and handle it; returns false on shutdown
    pub async fn step(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.handle(event),
            None => false,
        }
    }

    /// Handle one event; returns false on shutdown
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::MicToggle => self.toggle_mic(),
            Event::Speech(speech) => self.on_speech(speech),
            Event::Completed(completion) => self.on_completed(completion),
            Event::Feedback(text) => self.submit_feedback(text),
            Event::FeedbackSubmitted(status) => self.show_feedback_status(status),
            Event::TimerElapsed(timer) => {
                tracing::info!(%timer, "timer elapsed");
                self.speak(&timer.completion());
                self.ui.append_response(TIMER_COMPLETED_SUFFIX);
            }
            Event::ClearFeedbackStatus(generation) => {
                if generation == self.feedback_generation {
                    self.ui.set_feedback_status("");
                }
            }
            Event::PreferencesLoaded(prefs) => {
                self.apply_preferences(&prefs);
                if !self.greeted {
                    self.greeted = true;
                    self.greet_at(chrono::Local::now().hour());
                }
            }
            Event::Shutdown => return false,
        }
        true
    }

    /// Show and speak the greeting for `hour`
    pub fn greet_at(&mut self, hour: u32) {
        let greeting = startup_greeting(hour);
        self.ui.show_response(greeting);
        self.speak(greeting);
    }

    /// Apply stored preferences that affect the session (`language`, `voice`)
    pub fn apply_preferences(&mut self, prefs: &BTreeMap<String, Option<String>>) {
        if let Some(Some(language)) = prefs.get("language") {
            self.language.clone_from(language);
        }

        if let Some(Some(voice)) = prefs.get("voice") {
            let mut preferred = vec![voice.clone()];
            preferred.extend(self.preferred_voices.iter().cloned());
            self.voice = select_voice(&self.synthesizer.voices(), &preferred);
        }
    }

    fn load_preferences(&self) {
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let prefs = backend.preferences().await.unwrap_or_else(|e| {
                tracing::debug!(error = %e, "preferences unavailable, using configured defaults");
                BTreeMap::new()
            });
            let _ = events.send(Event::PreferencesLoaded(prefs));
        });
    }

    fn toggle_mic(&mut self) {
        match self.session.toggle_mic() {
            MicAction::Start => {
                if let Err(e) = self.recognizer.start(&self.language) {
                    tracing::warn!(error = %e, "failed to start recognition");
                    self.session.start_failed();
                    self.ui.set_status(RECOGNITION_ERROR_STATUS);
                    self.speak(START_FAILED_SPOKEN);
                }
            }
            MicAction::Stop => {
                self.recognizer.stop();
                self.ui.set_status(READY_STATUS);
            }
            MicAction::Ignored if !self.session.recognition_available() => {
                self.ui.set_status(UNAVAILABLE_STATUS);
                self.speak(RECOGNITION_UNAVAILABLE_SPOKEN);
            }
            MicAction::Ignored => {
                tracing::debug!(state = ?self.session.state(), "mic toggle ignored");
            }
        }
    }

    fn on_speech(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Started => {
                if self.session.on_started() {
                    self.ui.set_status(LISTENING_STATUS);
                }
            }
            SpeechEvent::Result(text) => match self.session.on_result(&text) {
                TranscriptOutcome::Accepted(transcript) => self.handle_transcript(&transcript),
                TranscriptOutcome::Empty => self.ui.set_status(READY_STATUS),
                TranscriptOutcome::Discarded => {}
            },
            SpeechEvent::Error(kind) => {
                if let Some(status) = self.session.on_error(&kind) {
                    self.ui.set_status(status);
                    self.session.recover();
                }
            }
            SpeechEvent::Ended => {
                if self.session.on_ended() {
                    self.ui.set_status(READY_STATUS);
                }
            }
            SpeechEvent::SpeakStarted(id) => {
                tracing::trace!(?id, "utterance started");
            }
            SpeechEvent::SpeakEnded(id) => self.finish_speaking(id),
            SpeechEvent::SpeakFailed(id) => {
                tracing::warn!(?id, "speech synthesis failed");
                self.finish_speaking(id);
            }
        }
    }

    fn finish_speaking(&mut self, id: UtteranceId) {
        if self.session.finish_speaking(id) {
            self.ui.set_status(READY_STATUS);
        }
    }

    fn handle_transcript(&mut self, transcript: &str) {
        self.ui.show_transcript(transcript);
        self.ui.set_status(PROCESSING_STATUS);
        self.request += 1;
        // Clear any earlier indicator before raising a new one
        drop(self.loading.take());
        self.loading = Some(LoadingGuard::new(Arc::clone(&self.ui)));

        match self.dispatcher.dispatch(transcript) {
            Action::Say(reply) => self.deliver(reply),
            Action::Open { url, reply } => {
                self.opener.open(&url);
                self.deliver(reply);
            }
            Action::StartTimer { timer, reply } => {
                self.start_timer(timer);
                self.deliver(reply);
            }
            Action::AddReminder(text) => self.call_backend(BackendCall::AddReminder(text)),
            Action::ListReminders => self.call_backend(BackendCall::ListReminders),
            Action::Query(text) => self.call_backend(BackendCall::Query(text)),
        }
    }

    fn call_backend(&self, call: BackendCall) {
        let request = self.request;
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let (reply, reminders) = call.run(backend.as_ref()).await;
            let _ = events.send(Event::Completed(Completion {
                request,
                reply,
                reminders,
            }));
        });
    }

    fn on_completed(&mut self, completion: Completion) {
        if completion.request != self.request {
            tracing::debug!(request = completion.request, "dropping superseded reply");
            return;
        }

        if let Some(reminders) = completion.reminders {
            self.reminders = reminders;
        }
        self.deliver(completion.reply);
    }

    fn deliver(&mut self, reply: Reply) {
        self.ui.show_response(&reply.display);
        self.speak(&reply.spoken);
        self.loading = None;

        self.session.finish_processing();
        if self.session.state() == SessionState::Idle {
            self.ui.set_status(READY_STATUS);
        }
    }

    fn start_timer(&self, timer: TimerRequest) {
        let events = self.events_tx.clone();
        tracing::debug!(%timer, "timer scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(timer.duration()).await;
            let _ = events.send(Event::TimerElapsed(timer));
        });
    }

    fn speak(&mut self, text: &str) {
        let id = self.synthesizer.speak(text, self.voice.as_ref());
        self.session.begin_speaking(id);
    }

    fn submit_feedback(&self, text: String) {
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let status = match backend.submit_feedback(&text).await {
                Ok(()) => FEEDBACK_THANKS,
                Err(Error::EmptyFeedback) => FEEDBACK_EMPTY,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to submit feedback");
                    FEEDBACK_FAILED
                }
            };
            let _ = events.send(Event::FeedbackSubmitted(status));
        });
    }

    fn show_feedback_status(&mut self, status: &'static str) {
        self.ui.set_feedback_status(status);

        self.feedback_generation += 1;
        let generation = self.feedback_generation;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(FEEDBACK_STATUS_TTL).await;
            let _ = events.send(Event::ClearFeedbackStatus(generation));
        });
    }
}
