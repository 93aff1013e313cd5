//! Error types for the Nova assistant

use thiserror::Error;

/// Result type alias for Nova operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant front-end or backend
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech adapter error (recognition unsupported, failed to start, ...)
    #[error("voice error: {0}")]
    Voice(String),

    /// Backend returned an unusable response
    #[error("backend error: {0}")]
    Backend(String),

    /// Language model API error
    #[error("language model error: {0}")]
    LanguageModel(String),

    /// Two alias entries map the same spoken name to different URLs
    #[error("conflicting alias {alias:?}: {first} vs {second}")]
    AliasConflict {
        alias: String,
        first: String,
        second: String,
    },

    /// Feedback text was empty after trimming
    #[error("feedback is empty")]
    EmptyFeedback,

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Regex compilation error
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
