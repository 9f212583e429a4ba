//! Per-occurrence run locks.
//!
//! At most one raffle or rejection run may work on an occurrence at a time.
//! A run holds a row in `run_locks` for its whole duration; the row is
//! removed when the returned guard is dropped. A process killed mid-run
//! leaves its row behind; [`Database::force_release_run_lock`] clears it.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::error::{Error, Result};
use crate::order::{EventSlug, SubEventId};

use super::connection::Database;

/// Builds the `run_locks` key of an occurrence.
fn lock_scope(event: &EventSlug, subevent: Option<SubEventId>) -> String {
    match subevent {
        Some(id) => format!("{event}/{id}"),
        None => format!("{event}/-"),
    }
}

/// Guard for a held run lock.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct RunLock<'a> {
    db: &'a Database,
    scope: String,
    released: bool,
}

impl RunLock<'_> {
    /// Returns the locked scope, `<event>/<subevent or ->`.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Releases the lock, reporting failures instead of logging them.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock row cannot be deleted.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.db.delete_lock(&self.scope)
    }
}

impl Drop for RunLock<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.db.delete_lock(&self.scope) {
            log::warn!("failed to release run lock {}: {e}", self.scope);
        }
    }
}

impl Database {
    /// Takes the run lock of an occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RunInProgress`] if another run holds the lock.
    pub fn acquire_run_lock(
        &self,
        event: &EventSlug,
        subevent: Option<SubEventId>,
    ) -> Result<RunLock<'_>> {
        let scope = lock_scope(event, subevent);
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO run_locks (scope, acquired_at) VALUES (?, ?)",
            params![scope, Utc::now().to_rfc3339()],
        )?;
        if inserted == 0 {
            return Err(Error::RunInProgress {
                event: event.to_string(),
                subevent,
            });
        }

        log::debug!("acquired run lock {scope}");
        Ok(RunLock {
            db: self,
            scope,
            released: false,
        })
    }

    /// Returns `true` if a run currently holds the occurrence's lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_run_locked(&self, event: &EventSlug, subevent: Option<SubEventId>) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM run_locks WHERE scope = ?",
            [lock_scope(event, subevent)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Returns when the occurrence's lock was taken, if it is held.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored time is malformed.
    pub fn run_lock_acquired_at(
        &self,
        event: &EventSlug,
        subevent: Option<SubEventId>,
    ) -> Result<Option<DateTime<Utc>>> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT acquired_at FROM run_locks WHERE scope = ?",
                [lock_scope(event, subevent)],
                |row| row.get(0),
            )
            .optional()?;

        stored
            .map(|text| {
                DateTime::parse_from_rfc3339(&text)
                    .map(|time| time.with_timezone(&Utc))
                    .map_err(|e| Error::Validation {
                        field: "acquired_at".into(),
                        message: e.to_string(),
                    })
            })
            .transpose()
    }

    /// Removes the occurrence's lock whoever holds it.
    ///
    /// Meant for recovering from a run that died without releasing its lock.
    /// Calling it while a live run holds the lock lets a second run start.
    /// Returns `true` if a lock was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock row cannot be deleted.
    pub fn force_release_run_lock(
        &self,
        event: &EventSlug,
        subevent: Option<SubEventId>,
    ) -> Result<bool> {
        let scope = lock_scope(event, subevent);
        let removed = self
            .conn
            .execute("DELETE FROM run_locks WHERE scope = ?", [&scope])?;
        if removed > 0 {
            log::warn!("forcibly released run lock {scope}");
        }
        Ok(removed > 0)
    }

    fn delete_lock(&self, scope: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM run_locks WHERE scope = ?", [scope])?;
        log::debug!("released run lock {scope}");
        Ok(())
    }
}
