//! Game repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load, list, create and replace whole game documents.
//! - Keep SQL and JSON column encoding inside the persistence boundary.
//!
//! # Invariants
//! - One repository instance reads and writes exactly one collection.
//! - `replace` overwrites only an existing row and bumps `revision` by one.
//! - Owned lists are deterministic: `updated_at DESC, id ASC`.

use crate::db::migrations::{stored_schema_version, supported_schema_version};
use crate::db::DbError;
use crate::model::game::{Action, Counter, Game, ItemContainer};
use crate::model::ids::{new_document_id, DocumentId};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const GAME_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    description,
    containers_json,
    counters_json,
    action_history_json,
    revision
FROM games";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage routing for game documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameCollection {
    /// Games being played.
    #[default]
    Games,
    /// Reusable templates.
    Library,
}

impl GameCollection {
    /// Picks the collection from the optional `library` request flag.
    pub fn from_library_flag(library: Option<bool>) -> Self {
        if library.unwrap_or(false) {
            Self::Library
        } else {
            Self::Games
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Games => "games",
            Self::Library => "library",
        }
    }
}

/// Errors from game persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No game with this id exists in the collection.
    NotFound(DocumentId),
    /// Stored revision differs from the one the caller edited.
    RevisionConflict {
        game_id: DocumentId,
        expected: u64,
        actual: u64,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted row cannot be decoded into a `Game`.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "game not found: {id}"),
            Self::RevisionConflict {
                game_id,
                expected,
                actual,
            } => write!(
                f,
                "game {game_id} is at revision {actual}, edit was based on {expected}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "game repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted game data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence gateway for game documents.
pub trait GameRepository {
    /// Loads one game by id. No ownership filter is applied.
    fn fetch(&self, game_id: &str) -> RepoResult<Option<Game>>;
    /// Lists every game owned by `owner_id`.
    fn list_owned(&self, owner_id: &str) -> RepoResult<Vec<Game>>;
    /// Inserts an empty game and returns its new id.
    fn create(&self, owner_id: &str, title: &str, description: &str) -> RepoResult<DocumentId>;
    /// Overwrites the stored document keyed by `game.id` and returns the new
    /// revision. When `expected_revision` is set it must match the stored one.
    fn replace(&mut self, game: &Game, expected_revision: Option<u64>) -> RepoResult<u64>;
}

/// SQLite-backed game repository bound to one collection.
pub struct SqliteGameRepository<'conn> {
    conn: &'conn mut Connection,
    collection: GameCollection,
}

impl<'conn> SqliteGameRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection, collection: GameCollection) -> RepoResult<Self> {
        ensure_game_connection_ready(conn)?;
        Ok(Self { conn, collection })
    }

    pub fn collection(&self) -> GameCollection {
        self.collection
    }
}

impl GameRepository for SqliteGameRepository<'_> {
    fn fetch(&self, game_id: &str) -> RepoResult<Option<Game>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GAME_SELECT_SQL}
             WHERE id = ?1
               AND collection = ?2;"
        ))?;
        let row = stmt
            .query_row(params![game_id, self.collection.as_str()], |row| {
                Ok(RawGameRow::from_row(row))
            })
            .optional()?;

        row.transpose()?.map(RawGameRow::into_game).transpose()
    }

    fn list_owned(&self, owner_id: &str) -> RepoResult<Vec<Game>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GAME_SELECT_SQL}
             WHERE owner_id = ?1
               AND collection = ?2
             ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![owner_id, self.collection.as_str()])?;
        let mut games = Vec::new();
        while let Some(row) = rows.next()? {
            games.push(RawGameRow::from_row(row)?.into_game()?);
        }
        Ok(games)
    }

    fn create(&self, owner_id: &str, title: &str, description: &str) -> RepoResult<DocumentId> {
        let game_id = new_document_id();
        self.conn.execute(
            "INSERT INTO games (
                id,
                collection,
                owner_id,
                title,
                description
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                game_id.as_str(),
                self.collection.as_str(),
                owner_id,
                title,
                description,
            ],
        )?;
        Ok(game_id)
    }

    fn replace(&mut self, game: &Game, expected_revision: Option<u64>) -> RepoResult<u64> {
        let containers_json = encode_json(&game.containers)?;
        let counters_json = encode_json(&game.counters)?;
        let history_json = encode_json(&game.action_history)?;
        let collection = self.collection.as_str();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored: Option<i64> = tx
            .query_row(
                "SELECT revision FROM games WHERE id = ?1 AND collection = ?2;",
                params![game.id.as_str(), collection],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            return Err(RepoError::NotFound(game.id.clone()));
        };
        let actual = revision_from_db(stored)?;

        if let Some(expected) = expected_revision {
            if expected != actual {
                return Err(RepoError::RevisionConflict {
                    game_id: game.id.clone(),
                    expected,
                    actual,
                });
            }
        }

        let next = actual + 1;
        tx.execute(
            "UPDATE games
             SET
                owner_id = ?3,
                title = ?4,
                description = ?5,
                containers_json = ?6,
                counters_json = ?7,
                action_history_json = ?8,
                revision = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND collection = ?2;",
            params![
                game.id.as_str(),
                collection,
                game.owner_id.as_str(),
                game.title.as_str(),
                game.description.as_str(),
                containers_json,
                counters_json,
                history_json,
                revision_to_db(next)?,
            ],
        )?;
        tx.commit()?;

        Ok(next)
    }
}

struct RawGameRow {
    id: String,
    owner_id: String,
    title: String,
    description: String,
    containers_json: String,
    counters_json: String,
    action_history_json: String,
    revision: i64,
}

impl RawGameRow {
    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            containers_json: row.get("containers_json")?,
            counters_json: row.get("counters_json")?,
            action_history_json: row.get("action_history_json")?,
            revision: row.get("revision")?,
        })
    }

    fn into_game(self) -> RepoResult<Game> {
        let containers: Vec<ItemContainer> =
            decode_json(&self.containers_json, "containers_json", &self.id)?;
        let counters: Vec<Counter> = decode_json(&self.counters_json, "counters_json", &self.id)?;
        let action_history: Vec<Action> =
            decode_json(&self.action_history_json, "action_history_json", &self.id)?;

        Ok(Game {
            revision: Some(revision_from_db(self.revision)?),
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            containers,
            counters,
            action_history,
        })
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode game column: {err}")))
}

fn decode_json<T: serde::de::DeserializeOwned>(
    raw: &str,
    column: &str,
    game_id: &str,
) -> RepoResult<T> {
    serde_json::from_str(raw).map_err(|err| {
        RepoError::InvalidData(format!("`{column}` of game {game_id} is not valid: {err}"))
    })
}

fn revision_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative revision {value}")))
}

fn revision_to_db(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("revision {value} overflows storage")))
}

fn ensure_game_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = supported_schema_version();
    let actual_version = stored_schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
