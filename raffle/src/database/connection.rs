//! Database connection management.

use rusqlite::{Connection, OpenFlags};

use crate::error::{Error, Result};

use super::config::DatabaseConfig;

/// The SQLite-backed store.
///
/// One `Database` serves as snapshot source, [`crate::service::OrderService`]
/// and [`crate::service::AuditLog`] for runs.
///
/// # Examples
///
/// ```no_run
/// use raffle::database::{Database, DatabaseConfig};
///
/// let db = Database::open(DatabaseConfig::new("/tmp/raffle.db")).unwrap();
/// ```
#[derive(Debug)]
pub struct Database {
    pub(super) conn: Connection,
    config: DatabaseConfig,
}

impl Database {
    /// Opens the database, creating and initializing it if allowed.
    ///
    /// Enables WAL journaling, foreign keys and the configured busy timeout,
    /// then initializes or verifies the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataDirectoryNotFound`] if the file is missing and
    /// auto-create is off, or an error if opening, configuring or schema
    /// verification fails.
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        if !config.path.exists() {
            if !config.auto_create {
                return Err(Error::DataDirectoryNotFound {
                    path: config.path.clone(),
                });
            }
            if let Some(parent) = config.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else if config.auto_create {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };

        let conn = Connection::open_with_flags(&config.path, flags)?;

        if !config.read_only {
            let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            conn.execute_batch("PRAGMA synchronous = NORMAL")?;
        }
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        conn.busy_timeout(config.busy_timeout)?;

        super::migrations::check_schema_compatibility(&conn)?;
        log::debug!("opened database at {}", config.path.display());

        Ok(Self { conn, config })
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the configuration the database was opened with.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file_in_wal_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("raffle.db");

        let db = Database::open(DatabaseConfig::new(&path)).unwrap();
        assert!(path.exists());

        let journal_mode: String = db
            .connection()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");

        let foreign_keys: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn test_missing_file_without_auto_create() {
        let dir = tempdir().unwrap();
        let mut config = DatabaseConfig::new(dir.path().join("absent.db"));
        config.auto_create = false;

        let err = Database::open(config).unwrap_err();
        assert!(matches!(err, Error::DataDirectoryNotFound { .. }));
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raffle.db");
        Database::open(DatabaseConfig::new(&path)).unwrap();

        let db = Database::open(DatabaseConfig::new(&path).read_only()).unwrap();
        assert!(db.config().read_only);
        let result = db
            .connection()
            .execute("CREATE TABLE scratch (id INTEGER)", []);
        assert!(result.is_err());
    }
}
