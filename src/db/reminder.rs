//! Reminder repository
//!
//! Reminders are append-only: there is no update or delete path.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::{DbPool, connection, parse_datetime};
use crate::Result;

/// A stored reminder
#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Reminder repository
#[derive(Clone)]
pub struct ReminderRepo {
    pool: DbPool,
}

impl ReminderRepo {
    /// Create a new reminder repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a reminder and return it
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn add(&self, text: &str) -> Result<Reminder> {
        let conn = connection(&self.pool)?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO reminders (reminder, created_at) VALUES (?1, ?2)",
            rusqlite::params![text, now.to_rfc3339_opts(SecondsFormat::Millis, true)],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, "reminder added");

        Ok(Reminder {
            id,
            text: text.to_string(),
            created_at: now,
        })
    }

    /// List all reminders, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list(&self) -> Result<Vec<Reminder>> {
        let conn = connection(&self.pool)?;

        let mut stmt = conn.prepare(
            "SELECT id, reminder, created_at FROM reminders
             ORDER BY created_at DESC, id DESC",
        )?;

        let reminders = stmt
            .query_map([], |row| {
                Ok(Reminder {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reminders)
    }

    /// List reminder texts, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn texts(&self) -> Result<Vec<String>> {
        Ok(self.list()?.into_iter().map(|r| r.text).collect())
    }
}
