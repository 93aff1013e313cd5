//! Feedback repository

use chrono::{DateTime, SecondsFormat, Utc};

use super::{DbPool, connection, parse_datetime};
use crate::Result;

/// A stored feedback entry
#[derive(Debug, Clone)]
pub struct FeedbackEntry {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Feedback repository
#[derive(Clone)]
pub struct FeedbackRepo {
    pool: DbPool,
}

impl FeedbackRepo {
    /// Create a new feedback repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store a feedback entry
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn add(&self, text: &str) -> Result<FeedbackEntry> {
        let conn = connection(&self.pool)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO feedback (feedback, created_at) VALUES (?1, ?2)",
            rusqlite::params![text, now.to_rfc3339_opts(SecondsFormat::Millis, true)],
        )?;

        Ok(FeedbackEntry {
            id: conn.last_insert_rowid(),
            text: text.to_string(),
            created_at: now,
        })
    }

    /// Fetch a feedback entry by id
    ///
    /// No HTTP endpoint reads feedback; this exists for operators and tests.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn get(&self, id: i64) -> Result<Option<FeedbackEntry>> {
        let conn = connection(&self.pool)?;

        let mut stmt =
            conn.prepare("SELECT id, feedback, created_at FROM feedback WHERE id = ?1")?;
        let mut rows = stmt.query_map([id], |row| {
            Ok(FeedbackEntry {
                id: row.get(0)?,
                text: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        Ok(rows.next().transpose()?)
    }
}
