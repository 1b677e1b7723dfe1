//! Core domain logic for the board-game state tracker.
//! This crate is the single source of truth for game document invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod state;
pub mod validation;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::game::{
    create_item, create_item_container, Action, Counter, CreateGameRequest, Game, Item,
    ItemContainer, Movement, MovementKind,
};
pub use model::ids::{
    is_document_id, is_entity_id, new_document_id, new_entity_id, normalize_document_id,
    DocumentId, EntityId,
};
pub use repo::game_repo::{
    GameCollection, GameRepository, RepoError, RepoResult, SqliteGameRepository,
};
pub use service::game_service::{GameService, GameServiceError};
pub use state::reducer::{
    apply_container_edit, apply_item_edit, upsert_container, upsert_counter, upsert_item,
    ContainerEdit, ItemEdit, ReducerError,
};
pub use validation::{
    validate_create_request, validate_game, FieldError, ValidationErrors, ValidationLimits,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
