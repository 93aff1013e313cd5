//! Voice command dispatch
//!
//! A finalized transcript is classified against an ordered list of rules; the
//! first rule that matches decides the [`Action`]. Classification is pure: the
//! session driver performs the side effects (speaking, opening URLs, timers,
//! backend calls).
//!
//! Rule order:
//!
//! 1. greeting (`hello`, `hey`)
//! 2. identity (`who are you`)
//! 3. `open <target>`
//! 4. `time`
//! 5. `date`
//! 6. `set a timer for N <unit>`
//! 7. `remind me to <text>`
//! 8. listing reminders
//! 9. weather, news
//! 10. anything else goes to the backend

pub mod aliases;
pub mod timer;

use chrono::NaiveDateTime;
use regex::Regex;

pub use aliases::AliasTable;
pub use timer::{TIMER_HELP, TimeUnit, TimerParser, TimerRequest};

use crate::Result;

/// Canned greeting
pub const GREETING: &str = "Hello! I'm Nova, your AI assistant. How can I help you today?";

/// Canned identity answer
pub const IDENTITY: &str =
    "I am Nova, your virtual assistant. I can open websites, tell the time and date, set timers, keep reminders, and answer questions.";

/// Canned weather answer (no weather provider is wired in)
pub const WEATHER_UNAVAILABLE: &str = "I'd need a weather API key to provide current weather information. You can ask me to search weather information online instead.";

/// Canned news answer (no news provider is wired in)
pub const NEWS_UNAVAILABLE: &str = "I'd need a news API key to provide current news. You can ask me to search for latest news online.";

/// Which rule matched a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Greeting,
    Identity,
    Open,
    Time,
    Date,
    Timer,
    AddReminder,
    ListReminders,
    Weather,
    News,
    Remote,
}

/// Text produced for one transcript: what is spoken and what is displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub spoken: String,
    pub display: String,
}

impl Reply {
    /// Reply whose display text equals its spoken text
    #[must_use]
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            display: text.clone(),
            spoken: text,
        }
    }

    /// Reply with distinct spoken and displayed text
    #[must_use]
    pub fn new(spoken: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            spoken: spoken.into(),
            display: display.into(),
        }
    }
}

/// What to do in response to a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Speak and display a reply; nothing else
    Say(Reply),
    /// Open a URL, then reply
    Open { url: String, reply: Reply },
    /// Schedule a one-shot timer, then confirm
    StartTimer { timer: TimerRequest, reply: Reply },
    /// Store a reminder through the backend
    AddReminder(String),
    /// Read back reminders from the backend
    ListReminders,
    /// Forward the transcript to the backend as an open-ended query
    Query(String),
}

struct Rules {
    greeting: Regex,
    identity: Regex,
    open: Regex,
    time: Regex,
    date: Regex,
    timer: Regex,
    timer_request: TimerParser,
    remind: Regex,
    list_reminders: Regex,
    weather: Regex,
    news: Regex,
}

impl Rules {
    fn compile() -> Result<Self> {
        Ok(Self {
            greeting: Regex::new(r"(?i)\b(?:hello|hey)\b")?,
            identity: Regex::new(r"(?i)\bwho are you\b")?,
            open: Regex::new(r"(?i)\bopen\s+(.+)$")?,
            time: Regex::new(r"(?i)\btime\b")?,
            date: Regex::new(r"(?i)\bdate\b")?,
            timer: Regex::new(r"(?i)\btimer\b")?,
            timer_request: TimerParser::new()?,
            remind: Regex::new(r"(?i)\bremind me to\s+(.+)$")?,
            list_reminders: Regex::new(
                r"(?i)\b(?:my|list|show|read)\s+(?:all\s+)?(?:my\s+)?reminders\b",
            )?,
            weather: Regex::new(r"(?i)\bweather\b")?,
            news: Regex::new(r"(?i)\bnews\b")?,
        })
    }
}

/// Classifies transcripts into actions
pub struct Dispatcher {
    rules: Rules,
    aliases: AliasTable,
}

impl Dispatcher {
    /// Create a dispatcher with the built-in alias table
    ///
    /// # Errors
    ///
    /// Returns error if the alias table has conflicts or a rule fails to compile
    pub fn new() -> Result<Self> {
        Self::with_aliases(AliasTable::builtin()?)
    }

    /// Create a dispatcher with a custom alias table
    ///
    /// # Errors
    ///
    /// Returns error if a rule fails to compile
    pub fn with_aliases(aliases: AliasTable) -> Result<Self> {
        Ok(Self {
            rules: Rules::compile()?,
            aliases,
        })
    }

    /// Which rule a transcript falls under (first match wins)
    #[must_use]
    pub fn classify(&self, transcript: &str) -> RuleKind {
        let text = transcript.trim();
        let r = &self.rules;

        if r.greeting.is_match(text) {
            RuleKind::Greeting
        } else if r.identity.is_match(text) {
            RuleKind::Identity
        } else if r.open.is_match(text) {
            RuleKind::Open
        } else if r.time.is_match(text) {
            RuleKind::Time
        } else if r.date.is_match(text) {
            RuleKind::Date
        } else if r.timer.is_match(text) {
            RuleKind::Timer
        } else if r.remind.is_match(text) {
            RuleKind::AddReminder
        } else if r.list_reminders.is_match(text) {
            RuleKind::ListReminders
        } else if r.weather.is_match(text) {
            RuleKind::Weather
        } else if r.news.is_match(text) {
            RuleKind::News
        } else {
            RuleKind::Remote
        }
    }

    /// Decide the action for a transcript using the local clock
    #[must_use]
    pub fn dispatch(&self, transcript: &str) -> Action {
        self.dispatch_at(transcript, chrono::Local::now().naive_local())
    }

    /// Decide the action for a transcript at a given local time
    #[must_use]
    pub fn dispatch_at(&self, transcript: &str, now: NaiveDateTime) -> Action {
        let text = transcript.trim();
        let kind = self.classify(text);
        tracing::debug!(?kind, transcript = text, "transcript classified");

        match kind {
            RuleKind::Greeting => Action::Say(Reply::same(GREETING)),
            RuleKind::Identity => Action::Say(Reply::same(IDENTITY)),
            RuleKind::Open => self.open_action(text),
            RuleKind::Time => {
                let time = now.format("%H:%M");
                Action::Say(Reply::same(format!("The time is {time}")))
            }
            RuleKind::Date => {
                let date = now.format("%d/%m/%Y");
                Action::Say(Reply::same(format!("Today's date is {date}")))
            }
            RuleKind::Timer => match self.rules.timer_request.parse(text) {
                Some(timer) => Action::StartTimer {
                    reply: Reply::same(timer.confirmation()),
                    timer,
                },
                None => Action::Say(Reply::same(TIMER_HELP)),
            },
            RuleKind::AddReminder => capture(&self.rules.remind, text)
                .map_or(Action::Query(text.to_string()), Action::AddReminder),
            RuleKind::ListReminders => Action::ListReminders,
            RuleKind::Weather => Action::Say(Reply::same(WEATHER_UNAVAILABLE)),
            RuleKind::News => Action::Say(Reply::same(NEWS_UNAVAILABLE)),
            RuleKind::Remote => Action::Query(text.to_string()),
        }
    }

    fn open_action(&self, text: &str) -> Action {
        let target = capture(&self.rules.open, text)
            .map(|t| {
                t.trim_end_matches(['.', '!', '?', ','])
                    .trim()
                    .to_lowercase()
            })
            .unwrap_or_default();

        if let Some(url) = self.aliases.get(&target) {
            return Action::Open {
                url: url.to_string(),
                reply: Reply::new(format!("Opening {target}"), format!("Opening {target}...")),
            };
        }

        if aliases::has_scheme(&target) || aliases::looks_like_domain(&target) {
            let url = if aliases::has_scheme(&target) {
                target
            } else {
                format!("https://{target}")
            };
            return Action::Open {
                reply: Reply::new(format!("Opening {url}"), format!("Opening {url}...")),
                url,
            };
        }

        Action::Say(Reply::same(format!(
            "I'm sorry, I don't know how to open {target}."
        )))
    }
}

/// First capture group of a pattern, trimmed and non-empty
fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new().unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn open_known_alias() {
        let action = dispatcher().dispatch("open youtube");
        match action {
            Action::Open { url, reply } => {
                assert_eq!(url, "https://youtube.com");
                assert!(reply.spoken.contains("youtube"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn open_preserves_multi_word_alias_and_strips_punctuation() {
        let action = dispatcher().dispatch("Open Epic Games.");
        assert!(matches!(action, Action::Open { ref url, .. } if url == "https://epicgames.com"));
    }

    #[test]
    fn open_unknown_target() {
        let action = dispatcher().dispatch("open sometotallyunknownplace");
        assert_eq!(
            action,
            Action::Say(Reply::same(
                "I'm sorry, I don't know how to open sometotallyunknownplace."
            ))
        );
    }

    #[test]
    fn open_domain_and_scheme() {
        let d = dispatcher();
        assert!(matches!(
            d.dispatch("open rust-lang.org"),
            Action::Open { ref url, .. } if url == "https://rust-lang.org"
        ));
        assert!(matches!(
            d.dispatch("open http://localhost.dev/admin"),
            Action::Open { ref url, .. } if url == "http://localhost.dev/admin"
        ));
    }

    #[test]
    fn time_and_date_formats() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch_at("what time is it", at(9, 5)),
            Action::Say(Reply::same("The time is 09:05"))
        );
        assert_eq!(
            d.dispatch_at("what is the date today", at(9, 5)),
            Action::Say(Reply::same("Today's date is 05/10/2026"))
        );
    }

    #[test]
    fn timer_is_not_shadowed_by_time() {
        let action = dispatcher().dispatch("set a timer for 2 minutes");
        match action {
            Action::StartTimer { timer, reply } => {
                assert_eq!(timer.duration(), std::time::Duration::from_secs(120));
                assert_eq!(reply.spoken, "Timer set for 2 minutes");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn bad_timer_gets_help() {
        let action = dispatcher().dispatch("set a timer for a while");
        assert_eq!(action, Action::Say(Reply::same(TIMER_HELP)));
    }

    #[test]
    fn first_match_wins() {
        let d = dispatcher();
        // Greeting outranks every later rule
        assert_eq!(d.classify("hey open youtube"), RuleKind::Greeting);
        assert_eq!(d.classify("hello what time is it"), RuleKind::Greeting);
        // Identity outranks open
        assert_eq!(d.classify("who are you, open github"), RuleKind::Identity);
        // Open outranks time
        assert_eq!(d.classify("open time.com"), RuleKind::Open);
        // Time outranks date
        assert_eq!(d.classify("time and date"), RuleKind::Time);
        // Date outranks timer
        assert_eq!(d.classify("date of my timer"), RuleKind::Date);
    }

    #[test]
    fn greeting_needs_whole_word() {
        let d = dispatcher();
        assert_eq!(d.classify("they said so"), RuleKind::Remote);
        assert_eq!(d.classify("Hey"), RuleKind::Greeting);
    }

    #[test]
    fn reminders_and_canned_topics() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch("Remind me to Call Mom"),
            Action::AddReminder("Call Mom".to_string())
        );
        assert_eq!(d.dispatch("what are my reminders"), Action::ListReminders);
        assert_eq!(d.dispatch("show reminders"), Action::ListReminders);
        assert_eq!(
            d.dispatch("how is the weather"),
            Action::Say(Reply::same(WEATHER_UNAVAILABLE))
        );
        assert_eq!(d.dispatch("any news"), Action::Say(Reply::same(NEWS_UNAVAILABLE)));
    }

    #[test]
    fn unmatched_goes_remote_with_original_casing() {
        assert_eq!(
            dispatcher().dispatch("  Explain Rust Lifetimes  "),
            Action::Query("Explain Rust Lifetimes".to_string())
        );
    }
}
