//! Preference repository (key/value settings such as language or auto-speak)

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use super::{DbPool, connection, parse_datetime};
use crate::Result;

/// A stored preference
#[derive(Debug, Clone)]
pub struct Preference {
    pub key: String,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Preference repository
#[derive(Clone)]
pub struct PreferenceRepo {
    pool: DbPool,
}

impl PreferenceRepo {
    /// Create a new preference repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a preference value
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
        let conn = connection(&self.pool)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        conn.execute(
            "INSERT INTO preferences (key, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;

        tracing::debug!(key, "preference saved");
        Ok(())
    }

    /// Get a single preference
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn get(&self, key: &str) -> Result<Option<Preference>> {
        let conn = connection(&self.pool)?;

        let mut stmt =
            conn.prepare("SELECT key, value, updated_at FROM preferences WHERE key = ?1")?;
        let mut rows = stmt.query_map([key], |row| {
            Ok(Preference {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        Ok(rows.next().transpose()?)
    }

    /// All preferences as a sorted key/value map
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn all(&self) -> Result<BTreeMap<String, Option<String>>> {
        let conn = connection(&self.pool)?;

        let mut stmt = conn.prepare("SELECT key, value FROM preferences")?;
        let map = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    #[test]
    fn set_then_overwrite() {
        let repo = PreferenceRepo::new(init_memory().unwrap());

        repo.set("language", Some("en-US")).unwrap();
        repo.set("language", Some("en-GB")).unwrap();

        let pref = repo.get("language").unwrap().unwrap();
        assert_eq!(pref.value.as_deref(), Some("en-GB"));
        assert_eq!(repo.all().unwrap().len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let repo = PreferenceRepo::new(init_memory().unwrap());
        assert!(repo.get("autoSpeak").unwrap().is_none());
    }
}
