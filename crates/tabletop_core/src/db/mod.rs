//! Game store bootstrap.
//!
//! # Responsibility
//! - Hand out SQLite connections whose schema matches this binary.
//! - Own the schema history of the `games` table.
//!
//! # Invariants
//! - The schema step last applied is recorded in `PRAGMA user_version`.
//! - A file written by a newer binary is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading the game store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Stored schema is ahead of every step this binary knows.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "game store was written with schema {found}; this build understands up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
