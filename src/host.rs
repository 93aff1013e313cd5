//! Host surfaces: where text is shown and how URLs are opened

use std::sync::Mutex;

/// Display surfaces updated by the session driver
pub trait UiSink: Send + Sync {
    /// Status line (`Ready to listen...`, `Listening...`, ...)
    fn set_status(&self, status: &str);

    /// Last recognized transcript
    fn show_transcript(&self, transcript: &str);

    /// Replace the response text
    fn show_response(&self, text: &str);

    /// Append to the response text
    fn append_response(&self, text: &str);

    /// Feedback status line; empty clears it
    fn set_feedback_status(&self, status: &str);

    /// Toggle the loading indicator
    fn set_loading(&self, loading: bool);
}

/// Opens URLs in a browser or equivalent
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// Terminal UI printing every update
#[derive(Debug, Default)]
pub struct ConsoleUi {
    last_status: Mutex<String>,
}

impl ConsoleUi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UiSink for ConsoleUi {
    fn set_status(&self, status: &str) {
        // Repeated status lines are noise on a terminal
        if let Ok(mut last) = self.last_status.lock() {
            if *last == status {
                return;
            }
            status.clone_into(&mut *last);
        }
        println!("[{status}]");
    }

    fn show_transcript(&self, transcript: &str) {
        println!("You: {transcript}");
    }

    fn show_response(&self, text: &str) {
        println!("Nova: {text}");
    }

    fn append_response(&self, text: &str) {
        println!("{}", text.trim_start_matches('\n'));
    }

    fn set_feedback_status(&self, status: &str) {
        if !status.is_empty() {
            println!("({status})");
        }
    }

    fn set_loading(&self, loading: bool) {
        tracing::trace!(loading, "loading indicator");
    }
}

/// Opener that prints URLs instead of launching a browser
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOpener;

impl UrlOpener for ConsoleOpener {
    fn open(&self, url: &str) {
        tracing::info!(url, "opening url");
        println!("→ {url}");
    }
}
