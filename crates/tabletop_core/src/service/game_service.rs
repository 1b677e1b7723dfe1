//! Game use-case service.
//!
//! # Responsibility
//! - Create, read, list and save games on behalf of an actor.
//! - Run checks in a fixed order: authentication, payload validation,
//!   existence, ownership, revision.
//!
//! # Invariants
//! - Nothing is written unless every check passed.
//! - Only the stored owner may save a game, and a save cannot change owner.
//! - Document ids (actor, `_id`, `ownerId`, container `owner`,
//!   `informedPlayers`) are compared and stored trimmed and lowercased.
//! - Saves are full-document replacements; the stored revision advances by
//!   exactly one per successful save.

use crate::model::game::{CreateGameRequest, Game};
use crate::model::ids::{is_document_id, normalize_document_id, DocumentId};
use crate::repo::game_repo::{GameRepository, RepoError};
use crate::validation::{validate_create_request, validate_game, ValidationErrors, ValidationLimits};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for game use-cases.
#[derive(Debug)]
pub enum GameServiceError {
    /// No authenticated actor.
    Unauthenticated,
    /// Payload violates the schema.
    Validation(ValidationErrors),
    /// Actor does not own the target game.
    Forbidden { game_id: DocumentId },
    /// Target game does not exist.
    GameNotFound(DocumentId),
    /// Save was based on a stale revision.
    RevisionConflict {
        game_id: DocumentId,
        expected: u64,
        actual: u64,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for GameServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "not logged in"),
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::Forbidden { game_id } => write!(f, "not the owner of game {game_id}"),
            Self::GameNotFound(game_id) => write!(f, "game not found: {game_id}"),
            Self::RevisionConflict {
                game_id,
                expected,
                actual,
            } => write!(
                f,
                "game {game_id} changed since it was loaded (revision {expected}, now {actual})"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent game state: {details}"),
        }
    }
}

impl Error for GameServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GameServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(game_id) => Self::GameNotFound(game_id),
            RepoError::RevisionConflict {
                game_id,
                expected,
                actual,
            } => Self::RevisionConflict {
                game_id,
                expected,
                actual,
            },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for GameServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

/// Game service facade over repository implementations.
pub struct GameService<R: GameRepository> {
    repo: R,
    limits: ValidationLimits,
}

impl<R: GameRepository> GameService<R> {
    /// Creates a service using default validation limits.
    pub fn new(repo: R) -> Self {
        Self::with_limits(repo, ValidationLimits::default())
    }

    pub fn with_limits(repo: R, limits: ValidationLimits) -> Self {
        Self { repo, limits }
    }

    /// Creates an empty game owned by `actor` and returns its id.
    pub fn create_game(
        &self,
        actor: Option<&str>,
        request: &CreateGameRequest,
    ) -> Result<DocumentId, GameServiceError> {
        let actor = require_actor(actor)?;
        validate_create_request(request, &self.limits)?;

        let game_id = self
            .repo
            .create(&actor, request.title.as_str(), request.description.as_str())?;
        info!("event=game_create module=service status=ok game_id={game_id}");
        Ok(game_id)
    }

    /// Loads one game by id.
    pub fn get_game(&self, game_id: &str) -> Result<Game, GameServiceError> {
        self.repo
            .fetch(game_id)?
            .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))
    }

    /// Lists games owned by `actor`, most recently saved first.
    pub fn list_owned(&self, actor: Option<&str>) -> Result<Vec<Game>, GameServiceError> {
        let actor = require_actor(actor)?;
        self.repo.list_owned(&actor).map_err(Into::into)
    }

    /// Saves a full game document on behalf of `actor`.
    ///
    /// `game_id` is the id the request addressed; it must match `game.id`.
    /// When `game.revision` is set, the save is rejected if the stored game
    /// moved past it. Returns the stored game after the write.
    pub fn update_game(
        &mut self,
        actor: Option<&str>,
        game_id: &str,
        mut game: Game,
    ) -> Result<Game, GameServiceError> {
        let actor = require_actor(actor)?;
        validate_game(&game, &self.limits)?;

        game.normalize_document_ids();
        let game_id = normalize_document_id(game_id);
        let game_id = game_id.as_str();
        if game.id != game_id {
            return Err(ValidationErrors::single("_id", "must match the game being updated").into());
        }

        let stored = self
            .repo
            .fetch(game_id)?
            .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
        if stored.owner_id != actor || game.owner_id != actor {
            warn!("event=game_update module=service status=forbidden game_id={game_id}");
            return Err(GameServiceError::Forbidden {
                game_id: game_id.to_string(),
            });
        }

        let expected = game.revision;
        let revision = self.repo.replace(&game, expected).map_err(|err| {
            warn!("event=game_update module=service status=error game_id={game_id} error={err}");
            GameServiceError::from(err)
        })?;
        info!("event=game_update module=service status=ok game_id={game_id} revision={revision}");

        self.repo
            .fetch(game_id)?
            .ok_or(GameServiceError::InconsistentState(
                "saved game not found in read-back",
            ))
    }
}

fn require_actor(actor: Option<&str>) -> Result<DocumentId, GameServiceError> {
    match actor.map(normalize_document_id) {
        Some(actor) if is_document_id(&actor) => Ok(actor),
        Some(_) => {
            warn!("event=actor_check module=service status=rejected reason=malformed_actor_id");
            Err(GameServiceError::Unauthenticated)
        }
        None => Err(GameServiceError::Unauthenticated),
    }
}
