//! Timer phrase parsing ("set a timer for 5 minutes")

use std::fmt;
use std::time::Duration;

use regex::Regex;

use crate::Result;

/// Usage hint spoken when a timer request cannot be parsed
pub const TIMER_HELP: &str =
    "I didn't understand the timer duration. Please say something like 'set a timer for 5 minutes'";

/// Extracts timer requests from transcripts
#[derive(Debug, Clone)]
pub struct TimerParser {
    pattern: Regex,
}

impl TimerParser {
    /// Compile the timer phrase pattern
    ///
    /// # Errors
    ///
    /// Returns error if the pattern fails to compile
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"(?i)\bset a timer for (\d+) (second|minute|hour)s?\b")?,
        })
    }

    /// Parse a timer request out of a transcript
    #[must_use]
    pub fn parse(&self, transcript: &str) -> Option<TimerRequest> {
        let caps = self.pattern.captures(transcript)?;
        let amount = caps.get(1)?.as_str().parse().ok()?;
        let unit = TimeUnit::parse(caps.get(2)?.as_str())?;
        TimerRequest::new(amount, unit)
    }
}

/// Unit of a timer duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    const fn seconds(self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 60 * 60,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "second" => Some(Self::Second),
            "minute" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            _ => None,
        }
    }
}

/// A parsed one-shot timer request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub amount: u64,
    pub unit: TimeUnit,
    duration: Duration,
}

impl TimerRequest {
    /// Build a timer request, rejecting zero and overflowing durations
    #[must_use]
    pub fn new(amount: u64, unit: TimeUnit) -> Option<Self> {
        if amount == 0 {
            return None;
        }
        let secs = amount.checked_mul(unit.seconds())?;
        Some(Self {
            amount,
            unit,
            duration: Duration::from_secs(secs),
        })
    }

    /// Delay until the timer fires
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Spoken confirmation when the timer is scheduled
    #[must_use]
    pub fn confirmation(&self) -> String {
        format!("Timer set for {self}")
    }

    /// Spoken message when the timer fires
    #[must_use]
    pub fn completion(&self) -> String {
        format!("Your timer for {self} is up!")
    }
}

impl fmt::Display for TimerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.amount > 1 { "s" } else { "" };
        write!(f, "{} {}{plural}", self.amount, self.unit.as_str())
    }
}
