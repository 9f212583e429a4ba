//! Schema initialization and version checks.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_CLIQUES_TABLE, CREATE_LOG_ENTRIES_TABLE, CREATE_LOG_ORDER_INDEX,
    CREATE_METADATA_TABLE, CREATE_ORDERS_EVENT_INDEX, CREATE_ORDERS_TABLE,
    CREATE_ORDER_CLIQUES_TABLE, CREATE_OVERRIDES_TABLE, CREATE_POSITIONS_ORDER_INDEX,
    CREATE_POSITIONS_TABLE, CREATE_QUOTAS_TABLE, CREATE_RUN_LOCKS_TABLE, CURRENT_SCHEMA_VERSION,
    INSERT_SCHEMA_VERSION, SELECT_SCHEMA_VERSION,
};

/// Creates all tables and indices and records the schema version.
///
/// # Errors
///
/// Returns an error if any statement fails.
///
/// # Examples
///
/// ```
/// use rusqlite::Connection;
/// use raffle::database::migrations::{get_schema_version, initialize_schema};
///
/// let conn = Connection::open_in_memory().unwrap();
/// initialize_schema(&conn).unwrap();
/// assert_eq!(get_schema_version(&conn).unwrap(), 1);
/// ```
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for statement in [
        CREATE_METADATA_TABLE,
        CREATE_ORDERS_TABLE,
        CREATE_POSITIONS_TABLE,
        CREATE_CLIQUES_TABLE,
        CREATE_ORDER_CLIQUES_TABLE,
        CREATE_OVERRIDES_TABLE,
        CREATE_QUOTAS_TABLE,
        CREATE_LOG_ENTRIES_TABLE,
        CREATE_RUN_LOCKS_TABLE,
        CREATE_ORDERS_EVENT_INDEX,
        CREATE_POSITIONS_ORDER_INDEX,
        CREATE_LOG_ORDER_INDEX,
    ] {
        tx.execute(statement, [])?;
    }
    tx.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION])?;
    tx.commit()?;

    log::debug!("initialized schema version {CURRENT_SCHEMA_VERSION}");
    Ok(())
}

/// Reads the schema version; 0 means the database is uninitialized.
///
/// # Errors
///
/// Returns an error if the query fails for any reason other than a missing
/// table or row.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result = conn.query_row(SELECT_SCHEMA_VERSION, [], |row| {
        let value: String = row.get(0)?;
        value.parse::<i32>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
    });

    match result {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(rusqlite::Error::SqliteFailure(ref err, Some(ref message)))
            if err.code == rusqlite::ErrorCode::Unknown && message.contains("no such table") =>
        {
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

/// Initializes a fresh database or verifies an existing one's version.
///
/// # Errors
///
/// Returns [`Error::UnsupportedSchemaVersion`] if the stored version differs
/// from the one this build understands.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    match get_schema_version(conn)? {
        0 => initialize_schema(conn),
        CURRENT_SCHEMA_VERSION => Ok(()),
        found => Err(Error::UnsupportedSchemaVersion {
            expected: CURRENT_SCHEMA_VERSION.unsigned_abs(),
            found: found.unsigned_abs(),
        }),
    }
}
