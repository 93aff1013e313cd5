//! Command history repository
//!
//! A history row is written in two phases: the command is recorded before the
//! reply is computed, then completed by row id once the reply is known. A crash
//! between the phases leaves `response` null.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::{DbPool, connection, parse_datetime};
use crate::{Error, Result};

/// Default number of history rows returned
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// A command and the reply it produced
#[derive(Debug, Clone, Serialize)]
pub struct CommandHistoryEntry {
    #[serde(skip)]
    pub id: i64,
    pub command: String,
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Command history repository
#[derive(Clone)]
pub struct HistoryRepo {
    pool: DbPool,
}

impl HistoryRepo {
    /// Create a new history repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a command with no response yet, returning its row id
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn record_command(&self, command: &str) -> Result<i64> {
        let conn = connection(&self.pool)?;

        conn.execute(
            "INSERT INTO command_history (command, created_at) VALUES (?1, ?2)",
            rusqlite::params![
                command,
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Attach the response to a previously recorded command
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no row has this id, or a database error
    pub fn set_response(&self, id: i64, response: &str) -> Result<()> {
        let conn = connection(&self.pool)?;

        let updated = conn.execute(
            "UPDATE command_history SET response = ?1 WHERE id = ?2",
            rusqlite::params![response, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("command history row {id}")));
        }
        Ok(())
    }

    /// List the most recent entries, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn recent(&self, limit: usize) -> Result<Vec<CommandHistoryEntry>> {
        let conn = connection(&self.pool)?;

        let mut stmt = conn.prepare(
            "SELECT id, command, response, created_at FROM command_history
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map([limit], |row| {
                Ok(CommandHistoryEntry {
                    id: row.get(0)?,
                    command: row.get(1)?,
                    response: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
