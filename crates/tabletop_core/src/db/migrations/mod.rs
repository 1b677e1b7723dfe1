//! Schema history of the game store.
//!
//! Each step is a SQL batch numbered from 1. Opening a connection runs the
//! steps above the stored `user_version` inside one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(step, sql)` pairs in the order they must run.
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_games.sql"))];

/// Highest schema step this build can produce.
pub fn supported_schema_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(step, _)| *step)
}

/// Schema step recorded in the database header; 0 for a fresh file.
pub fn stored_schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings `conn` up to [`supported_schema_version`].
///
/// # Errors
/// - `SchemaTooNew` when the stored step is ahead of this build.
/// - `Sqlite` when a step fails; nothing from the failed run is kept.
pub fn upgrade_schema(conn: &mut Connection) -> DbResult<()> {
    let found = stored_schema_version(conn)?;
    let supported = supported_schema_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending: Vec<_> = SCHEMA_STEPS
        .iter()
        .filter(|(step, _)| *step > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", step)?;
        info!("event=db_migrate module=db status=ok version={step}");
    }
    tx.commit()?;
    Ok(())
}
