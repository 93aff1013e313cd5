//! HTTP client for the assistant backend
//!
//! Queries never fail from the caller's point of view: when the backend is
//! unreachable or answers badly, the client falls back to a web search.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::host::UrlOpener;
use crate::{Error, Result};

/// Answer to an open-ended query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryReply {
    /// The backend answered
    Answer(String),
    /// The backend failed and a web search was opened instead
    WebSearch { query: String, url: String },
}

/// Operations the session needs from the assistant backend
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Ask an open-ended question
    async fn query(&self, text: &str) -> QueryReply;

    /// Store a reminder, returning the full list newest first
    async fn add_reminder(&self, text: &str) -> Result<Vec<String>>;

    /// All reminders, newest first; an empty list is not a failure
    async fn list_reminders(&self) -> Result<Vec<String>>;

    /// Submit feedback text
    async fn submit_feedback(&self, text: &str) -> Result<()>;

    /// Stored preferences
    async fn preferences(&self) -> Result<BTreeMap<String, Option<String>>>;

    /// Store one preference
    async fn set_preference(&self, key: &str, value: Option<&str>) -> Result<()>;
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    response: Option<String>,
}

#[derive(Serialize)]
struct ReminderRequest<'a> {
    reminder: &'a str,
}

#[derive(Deserialize)]
struct RemindersResponse {
    reminders: Vec<String>,
}

#[derive(Serialize)]
struct FeedbackRequest<'a> {
    feedback: &'a str,
}

#[derive(Deserialize)]
struct PreferencesResponse {
    preferences: BTreeMap<String, Option<String>>,
}

#[derive(Serialize)]
struct PreferenceRequest<'a> {
    key: &'a str,
    value: Option<&'a str>,
}

/// Backend client over HTTP
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    search_url: String,
    wake_words: Option<Regex>,
    opener: Arc<dyn UrlOpener>,
}

impl RemoteClient {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or wake-word pattern cannot be built
    pub fn new(config: &ClientConfig, opener: Arc<dyn UrlOpener>) -> Result<Self> {
        let words: Vec<String> = config
            .wake_words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();

        let wake_words = if words.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("(?i){}", words.join("|")))?)
        };

        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            search_url: config.search_url.clone(),
            wake_words,
            opener,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Search query for a transcript: wake-words removed, trimmed
    #[must_use]
    pub fn search_query(&self, text: &str) -> String {
        self.wake_words
            .as_ref()
            .map_or_else(|| text.to_string(), |re| re.replace_all(text, "").into_owned())
            .trim()
            .to_string()
    }

    fn web_search(&self, text: &str) -> QueryReply {
        let query = self.search_query(text);
        let url = format!("{}{}", self.search_url, urlencoding::encode(&query));
        self.opener.open(&url);
        QueryReply::WebSearch { query, url }
    }

    async fn try_query(&self, text: &str) -> Result<String> {
        let response = self
            .http
            .post(self.url("/api/query"))
            .json(&QueryRequest { message: text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Backend(format!("query failed: {}", response.status())));
        }

        let body: QueryResponse = response.json().await?;
        body.response
            .filter(|r| !r.is_empty())
            .ok_or_else(|| Error::Backend("query response missing".to_string()))
    }

    async fn reminders_from(response: reqwest::Response) -> Result<Vec<String>> {
        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "reminders request failed: {}",
                response.status()
            )));
        }
        let body: RemindersResponse = response.json().await?;
        Ok(body.reminders)
    }
}

#[async_trait]
impl AssistantBackend for RemoteClient {
    async fn query(&self, text: &str) -> QueryReply {
        match self.try_query(text).await {
            Ok(answer) => QueryReply::Answer(answer),
            Err(e) => {
                tracing::warn!(error = %e, "backend query failed, falling back to web search");
                self.web_search(text)
            }
        }
    }

    async fn add_reminder(&self, text: &str) -> Result<Vec<String>> {
        let response = self
            .http
            .post(self.url("/api/reminders"))
            .json(&ReminderRequest { reminder: text })
            .send()
            .await?;
        Self::reminders_from(response).await
    }

    async fn list_reminders(&self) -> Result<Vec<String>> {
        let response = self.http.get(self.url("/api/reminders")).send().await?;
        Self::reminders_from(response).await
    }

    async fn submit_feedback(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyFeedback);
        }

        let response = self
            .http
            .post(self.url("/api/feedback"))
            .json(&FeedbackRequest { feedback: text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "feedback rejected: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn preferences(&self) -> Result<BTreeMap<String, Option<String>>> {
        let response = self.http.get(self.url("/api/preferences")).send().await?;
        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "preferences request failed: {}",
                response.status()
            )));
        }
        let body: PreferencesResponse = response.json().await?;
        Ok(body.preferences)
    }

    async fn set_preference(&self, key: &str, value: Option<&str>) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/preferences"))
            .json(&PreferenceRequest { key, value })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "preference rejected: {}",
                response.status()
            )));
        }
        Ok(())
    }
}
