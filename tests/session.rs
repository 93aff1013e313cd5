//! Session driver tests with in-process speech adapters and backend

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nova_assistant::config::VoiceConfig;
use nova_assistant::host::{UiSink, UrlOpener};
use nova_assistant::session::{
    self, Completion, DriverParts, EventSender, PROCESSING_STATUS, READY_STATUS, SessionState,
    UNAVAILABLE_STATUS, startup_greeting,
};
use nova_assistant::voice::{
    RECOGNITION_ERROR_STATUS, RecognitionErrorKind, SpeechEvent, SpeechRecognizer,
    SpeechSynthesizer, UtteranceId, Voice,
};
use nova_assistant::{
    AssistantBackend, Dispatcher, Error, Event, QueryReply, Reply, Result, SessionDriver,
};
use tokio::time::Instant;

#[derive(Default)]
struct Log {
    statuses: Vec<String>,
    transcripts: Vec<String>,
    responses: Vec<String>,
    appended: Vec<String>,
    feedback: Vec<String>,
    loading: Vec<bool>,
    opened: Vec<String>,
    spoken: Vec<(Instant, String)>,
    started_with: Vec<String>,
    stops: usize,
}

type Shared = Arc<Mutex<Log>>;

struct TestUi(Shared);

impl UiSink for TestUi {
    fn set_status(&self, status: &str) {
        self.0.lock().unwrap().statuses.push(status.to_string());
    }
    fn show_transcript(&self, transcript: &str) {
        self.0.lock().unwrap().transcripts.push(transcript.to_string());
    }
    fn show_response(&self, text: &str) {
        self.0.lock().unwrap().responses.push(text.to_string());
    }
    fn append_response(&self, text: &str) {
        self.0.lock().unwrap().appended.push(text.to_string());
    }
    fn set_feedback_status(&self, status: &str) {
        self.0.lock().unwrap().feedback.push(status.to_string());
    }
    fn set_loading(&self, loading: bool) {
        self.0.lock().unwrap().loading.push(loading);
    }
}

struct TestOpener(Shared);

impl UrlOpener for TestOpener {
    fn open(&self, url: &str) {
        self.0.lock().unwrap().opened.push(url.to_string());
    }
}

#[derive(Clone, Copy)]
enum Mic {
    Working,
    Unsupported,
    Broken,
}

struct TestRecognizer {
    log: Shared,
    mic: Mic,
}

impl SpeechRecognizer for TestRecognizer {
    fn is_available(&self) -> bool {
        !matches!(self.mic, Mic::Unsupported)
    }

    fn start(&mut self, language: &str) -> Result<()> {
        if matches!(self.mic, Mic::Broken) {
            return Err(Error::Voice("microphone busy".to_string()));
        }
        self.log.lock().unwrap().started_with.push(language.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().stops += 1;
    }
}

struct TestSynth {
    log: Shared,
    events: EventSender,
    next: u64,
}

impl SpeechSynthesizer for TestSynth {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: "Test Voice".to_string(),
            lang: "en-US".to_string(),
        }]
    }

    fn speak(&mut self, text: &str, _voice: Option<&Voice>) -> UtteranceId {
        self.next += 1;
        let id = UtteranceId(self.next);
        self.log
            .lock()
            .unwrap()
            .spoken
            .push((Instant::now(), text.to_string()));
        let _ = self.events.send(Event::Speech(SpeechEvent::SpeakStarted(id)));
        let _ = self.events.send(Event::Speech(SpeechEvent::SpeakEnded(id)));
        id
    }
}

#[derive(Default)]
struct TestBackend {
    /// `None` makes reminder calls fail
    reminders: Option<Vec<String>>,
    reply: Option<QueryReply>,
    /// Queries never complete
    hang: bool,
    preferences: BTreeMap<String, Option<String>>,
}

#[async_trait]
impl AssistantBackend for TestBackend {
    async fn query(&self, text: &str) -> QueryReply {
        if self.hang {
            return std::future::pending().await;
        }
        self.reply
            .clone()
            .unwrap_or_else(|| QueryReply::Answer(format!("answer to {text}")))
    }

    async fn add_reminder(&self, text: &str) -> Result<Vec<String>> {
        let mut list = self
            .reminders
            .clone()
            .ok_or_else(|| Error::Backend("offline".to_string()))?;
        list.insert(0, text.to_string());
        Ok(list)
    }

    async fn list_reminders(&self) -> Result<Vec<String>> {
        self.reminders
            .clone()
            .ok_or_else(|| Error::Backend("offline".to_string()))
    }

    async fn submit_feedback(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::EmptyFeedback);
        }
        Ok(())
    }

    async fn preferences(&self) -> Result<BTreeMap<String, Option<String>>> {
        Ok(self.preferences.clone())
    }

    async fn set_preference(&self, _key: &str, _value: Option<&str>) -> Result<()> {
        Ok(())
    }
}

fn build_with(backend: TestBackend, mic: Mic) -> (SessionDriver, EventSender, Shared) {
    let log = Shared::default();
    let (tx, rx) = session::channel();

    let parts = DriverParts {
        dispatcher: Dispatcher::new().unwrap(),
        backend: Arc::new(backend),
        ui: Arc::new(TestUi(Arc::clone(&log))),
        opener: Arc::new(TestOpener(Arc::clone(&log))),
        recognizer: Box::new(TestRecognizer {
            log: Arc::clone(&log),
            mic,
        }),
        synthesizer: Box::new(TestSynth {
            log: Arc::clone(&log),
            events: tx.clone(),
            next: 0,
        }),
    };

    let driver = SessionDriver::new(parts, &VoiceConfig::default(), (tx.clone(), rx));
    (driver, tx, log)
}

fn build(backend: TestBackend) -> (SessionDriver, EventSender, Shared) {
    build_with(backend, Mic::Working)
}

/// Handle queued and soon-to-arrive events until the channel goes quiet
async fn settle(driver: &mut SessionDriver) {
    while let Ok(true) = tokio::time::timeout(Duration::from_millis(50), driver.step()).await {}
}

fn result(text: &str) -> Event {
    Event::Speech(SpeechEvent::Result(text.to_string()))
}

fn spoken(log: &Shared) -> Vec<String> {
    log.lock()
        .unwrap()
        .spoken
        .iter()
        .map(|(_, text)| text.clone())
        .collect()
}

#[tokio::test]
async fn test_double_toggle_never_processes() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::MicToggle);
    assert_eq!(driver.session().state(), SessionState::Listening);
    driver.handle(Event::MicToggle);
    assert_eq!(driver.session().state(), SessionState::Idle);

    // A result delivered after the stop is discarded
    driver.handle(result("what time is it"));
    assert_eq!(driver.session().state(), SessionState::Idle);

    let log = log.lock().unwrap();
    assert_eq!(log.started_with.len(), 1);
    assert_eq!(log.stops, 1);
    assert!(log.transcripts.is_empty());
    assert!(log.spoken.is_empty());
    assert!(!log.statuses.iter().any(|s| s == PROCESSING_STATUS));
}

#[tokio::test]
async fn test_open_youtube() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::MicToggle);
    driver.handle(result("open youtube"));

    assert_eq!(driver.session().state(), SessionState::Speaking);
    let log = log.lock().unwrap();
    assert_eq!(log.opened, vec!["https://youtube.com"]);
    assert_eq!(log.spoken.len(), 1);
    assert_eq!(log.spoken[0].1, "Opening youtube");
    assert_eq!(log.responses, vec!["Opening youtube..."]);
    assert_eq!(log.loading, vec![true, false]);
}

#[tokio::test]
async fn test_unknown_open_target_opens_nothing() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::MicToggle);
    driver.handle(result("open sometotallyunknownplace"));

    assert!(log.lock().unwrap().opened.is_empty());
    assert_eq!(
        spoken(&log),
        vec!["I'm sorry, I don't know how to open sometotallyunknownplace."]
    );
}

#[tokio::test]
async fn test_mic_ignored_while_speaking() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::MicToggle);
    driver.handle(result("hello"));
    assert_eq!(driver.session().state(), SessionState::Speaking);

    driver.handle(Event::MicToggle);
    assert_eq!(log.lock().unwrap().started_with.len(), 1);

    driver.handle(Event::Speech(SpeechEvent::SpeakEnded(UtteranceId(1))));
    assert_eq!(driver.session().state(), SessionState::Idle);
    assert_eq!(log.lock().unwrap().statuses.last().unwrap(), READY_STATUS);
}

#[tokio::test]
async fn test_blank_result_restores_ready_status() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::MicToggle);
    driver.handle(Event::Speech(SpeechEvent::Started));
    driver.handle(result("   "));
    driver.handle(Event::Speech(SpeechEvent::Ended));

    assert_eq!(driver.session().state(), SessionState::Idle);
    let log = log.lock().unwrap();
    assert_eq!(log.statuses, vec!["Listening...", READY_STATUS]);
    assert!(log.transcripts.is_empty());
    assert!(log.spoken.is_empty());
}

#[tokio::test]
async fn test_recognition_error_surfaces_without_retry() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::MicToggle);
    driver.handle(Event::Speech(SpeechEvent::Error(RecognitionErrorKind::NotAllowed)));

    assert_eq!(driver.session().state(), SessionState::Idle);
    let log = log.lock().unwrap();
    assert_eq!(log.statuses.last().unwrap(), "Microphone permission denied.");
    assert_eq!(log.started_with.len(), 1);
}

#[tokio::test]
async fn test_unsupported_recognition_apologizes() {
    let (mut driver, _tx, log) = build_with(TestBackend::default(), Mic::Unsupported);

    driver.handle(Event::MicToggle);

    assert_eq!(driver.session().state(), SessionState::Idle);
    let log = log.lock().unwrap();
    assert!(log.started_with.is_empty());
    assert_eq!(log.statuses.last().unwrap(), UNAVAILABLE_STATUS);
    assert_eq!(log.spoken.len(), 1);
    assert!(log.spoken[0].1.starts_with("Sorry, speech recognition is not available"));
}

#[tokio::test]
async fn test_start_failure_apologizes() {
    let (mut driver, _tx, log) = build_with(TestBackend::default(), Mic::Broken);

    driver.handle(Event::MicToggle);

    assert_eq!(driver.session().state(), SessionState::Idle);
    assert_eq!(
        log.lock().unwrap().statuses.last().unwrap(),
        RECOGNITION_ERROR_STATUS
    );
    assert_eq!(
        spoken(&log),
        vec!["Sorry, I could not start listening. Please check your microphone settings."]
    );

    // Nothing is stuck: the next press tries again
    settle(&mut driver).await;
    driver.handle(Event::MicToggle);
    assert_eq!(spoken(&log).len(), 2);
}

#[test]
fn test_greeting_follows_time_of_day() {
    assert!(startup_greeting(0).starts_with("Good Morning! I'm Nova"));
    assert!(startup_greeting(11).starts_with("Good Morning"));
    assert!(startup_greeting(12).starts_with("Good afternoon"));
    assert!(startup_greeting(15).starts_with("Good afternoon"));
    assert!(startup_greeting(16).starts_with("Good evening"));
    assert!(startup_greeting(23).starts_with("Good evening"));
}

#[tokio::test]
async fn test_greets_once_after_preferences_load() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::PreferencesLoaded(BTreeMap::new()));
    driver.handle(Event::PreferencesLoaded(BTreeMap::new()));

    let greetings = [startup_greeting(9), startup_greeting(13), startup_greeting(20)];
    let log = log.lock().unwrap();
    assert_eq!(log.spoken.len(), 1);
    assert!(greetings.contains(&log.spoken[0].1.as_str()));
    assert_eq!(log.responses, vec![log.spoken[0].1.clone()]);
}

#[tokio::test]
async fn test_greet_at_shows_and_speaks() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.greet_at(14);

    assert_eq!(
        spoken(&log),
        vec!["Good afternoon! Ready to assist you with anything?"]
    );
    assert_eq!(
        log.lock().unwrap().responses,
        vec!["Good afternoon! Ready to assist you with anything?"]
    );
}

#[tokio::test]
async fn test_empty_reminders_differ_from_failure() {
    let (mut driver, _tx, log) = build(TestBackend {
        reminders: Some(Vec::new()),
        ..TestBackend::default()
    });
    driver.handle(Event::MicToggle);
    driver.handle(result("show my reminders"));
    settle(&mut driver).await;
    assert_eq!(spoken(&log), vec!["You have no reminders."]);

    let (mut driver, _tx, log) = build(TestBackend::default());
    driver.handle(Event::MicToggle);
    driver.handle(result("show my reminders"));
    settle(&mut driver).await;
    assert_eq!(
        spoken(&log),
        vec!["I couldn't retrieve your reminders. Please try again later."]
    );
}

#[tokio::test]
async fn test_add_reminder_updates_cache_only_on_success() {
    let (mut driver, _tx, log) = build(TestBackend {
        reminders: Some(vec!["old".to_string()]),
        ..TestBackend::default()
    });
    driver.handle(Event::MicToggle);
    driver.handle(result("remind me to stretch"));
    settle(&mut driver).await;

    assert_eq!(driver.reminders(), ["stretch", "old"]);
    assert_eq!(spoken(&log), vec!["Reminder added: stretch"]);
    assert_eq!(log.lock().unwrap().loading, vec![true, false]);

    let (mut driver, _tx, log) = build(TestBackend::default());
    driver.handle(Event::MicToggle);
    driver.handle(result("remind me to stretch"));
    settle(&mut driver).await;

    assert!(driver.reminders().is_empty());
    assert_eq!(
        spoken(&log),
        vec!["I couldn't save your reminder. Please try again later."]
    );
}

#[tokio::test]
async fn test_web_search_fallback_reply() {
    let (mut driver, _tx, log) = build(TestBackend {
        reply: Some(QueryReply::WebSearch {
            query: "quantum foam".to_string(),
            url: "https://www.google.com/search?q=quantum%20foam".to_string(),
        }),
        ..TestBackend::default()
    });

    driver.handle(Event::MicToggle);
    driver.handle(result("nova quantum foam"));
    assert_eq!(driver.session().state(), SessionState::Processing);
    settle(&mut driver).await;

    assert_eq!(driver.session().state(), SessionState::Idle);
    let log = log.lock().unwrap();
    assert_eq!(
        log.spoken[0].1,
        "I couldn't find an answer. Let me search the internet for you."
    );
    assert_eq!(
        log.responses,
        vec!["I'm not sure about that. Searching the web for: quantum foam"]
    );
}

#[tokio::test]
async fn test_superseded_completion_is_dropped() {
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.handle(Event::Completed(Completion {
        request: 7,
        reply: Reply::same("late answer"),
        reminders: Some(vec!["late".to_string()]),
    }));

    assert!(spoken(&log).is_empty());
    assert!(driver.reminders().is_empty());
    assert_eq!(driver.session().state(), SessionState::Idle);
}

#[tokio::test]
async fn test_language_preference_applies() {
    let mut preferences = BTreeMap::new();
    preferences.insert("language".to_string(), Some("hi-IN".to_string()));
    let (mut driver, _tx, log) = build(TestBackend::default());

    driver.apply_preferences(&preferences);
    driver.handle(Event::MicToggle);

    assert_eq!(driver.language(), "hi-IN");
    assert_eq!(log.lock().unwrap().started_with, vec!["hi-IN"]);
}

#[tokio::test(start_paused = true)]
async fn test_stored_language_loaded_on_startup() {
    let mut preferences = BTreeMap::new();
    preferences.insert("language".to_string(), Some("en-IN".to_string()));
    let (driver, tx, log) = build(TestBackend {
        preferences,
        ..TestBackend::default()
    });
    let task = tokio::spawn(driver.run());

    // Let the greeting finish before pressing the mic
    tokio::time::sleep(Duration::from_millis(10)).await;
    tx.send(Event::MicToggle).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    tx.send(Event::Shutdown).unwrap();
    task.await.unwrap();

    assert_eq!(log.lock().unwrap().started_with, vec!["en-IN"]);
}

#[tokio::test(start_paused = true)]
async fn test_timers_fire_independently() {
    let (driver, tx, log) = build(TestBackend::default());
    let task = tokio::spawn(driver.run());

    tx.send(Event::MicToggle).unwrap();
    tx.send(result("set a timer for 2 minutes")).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    tx.send(Event::MicToggle).unwrap();
    tx.send(result("set a timer for 1 minute")).unwrap();
    tokio::time::sleep(Duration::from_secs(130)).await;

    tx.send(Event::Shutdown).unwrap();
    task.await.unwrap();

    let log = log.lock().unwrap();
    let at = |text: &str| {
        log.spoken
            .iter()
            .find(|(_, t)| t == text)
            .map(|(when, _)| *when)
            .unwrap_or_else(|| panic!("never spoke {text:?}"))
    };

    let two_minutes = at("Your timer for 2 minutes is up!") - at("Timer set for 2 minutes");
    assert!(two_minutes >= Duration::from_millis(119_500));
    assert!(two_minutes < Duration::from_millis(120_500));

    let one_minute = at("Your timer for 1 minute is up!") - at("Timer set for 1 minute");
    assert!(one_minute >= Duration::from_millis(59_500));
    assert!(one_minute < Duration::from_millis(60_500));

    assert_eq!(log.appended, vec!["\n⏰ Timer completed!"; 2]);
}

#[tokio::test(start_paused = true)]
async fn test_timer_fires_while_query_is_pending() {
    let (driver, tx, log) = build(TestBackend {
        hang: true,
        ..TestBackend::default()
    });
    let task = tokio::spawn(driver.run());

    tx.send(Event::MicToggle).unwrap();
    tx.send(result("set a timer for 5 seconds")).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    tx.send(Event::MicToggle).unwrap();
    tx.send(result("explain quantum foam")).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Recognizer failures still surface while the query is outstanding
    tx.send(Event::Speech(SpeechEvent::Error(RecognitionErrorKind::Other(
        "network".to_string(),
    ))))
    .unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    tx.send(Event::Shutdown).unwrap();
    task.await.unwrap();

    let log = log.lock().unwrap();
    let said: Vec<&str> = log.spoken.iter().map(|(_, t)| t.as_str()).collect();
    assert!(said.contains(&"Your timer for 5 seconds is up!"), "{said:?}");
    assert!(!said.iter().any(|t| t.contains("quantum")));
    assert!(log.statuses.iter().any(|s| s == RECOGNITION_ERROR_STATUS));
    assert_eq!(log.appended, vec!["\n⏰ Timer completed!"]);
}

#[tokio::test(start_paused = true)]
async fn test_feedback_status_clears_after_five_seconds() {
    let (driver, tx, log) = build(TestBackend::default());
    let task = tokio::spawn(driver.run());

    tx.send(Event::Feedback("great assistant".to_string())).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(
        log.lock().unwrap().feedback,
        vec!["Thank you for your feedback!"]
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        log.lock().unwrap().feedback,
        vec!["Thank you for your feedback!", ""]
    );

    tx.send(Event::Feedback("   ".to_string())).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(
        log.lock().unwrap().feedback.last().unwrap(),
        "Please enter feedback before submitting."
    );

    tx.send(Event::Shutdown).unwrap();
    task.await.unwrap();
}
