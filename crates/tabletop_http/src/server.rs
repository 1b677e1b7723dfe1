//! Router assembly and server lifecycle.

use crate::api::{self, AppState};
use crate::config::{ConfigError, ServerConfig};
use crate::session::TokenSessions;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tabletop_core::db::{open_db, DbError};
use tokio::net::TcpListener;

#[derive(Debug)]
pub enum ServeError {
    Config(ConfigError),
    Db(DbError),
    Io(std::io::Error),
}

impl Display for ServeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "database bootstrap failed: {err}"),
            Self::Io(err) => write!(f, "server io failed: {err}"),
        }
    }
}

impl Error for ServeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ServeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for ServeError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ServeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Builds the application router. JSON routes live under `api_prefix`.
pub fn router(state: AppState, api_prefix: &str) -> Router {
    let game_routes = Router::new()
        .route("/game/create", post(api::create_game))
        .route("/game/:id/update", post(api::update_game))
        .route("/game/:id", get(api::get_game))
        .route("/games", get(api::list_games));

    Router::new()
        .route("/healthz", get(api::health))
        .nest(api_prefix, game_routes)
        .with_state(state)
}

/// Builds handler state from config.
pub fn app_state(config: &ServerConfig) -> AppState {
    AppState::new(
        config.db_path.clone(),
        Arc::new(TokenSessions::from(&config.sessions)),
        config.limits,
    )
}

/// Migrates the database, binds and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), ServeError> {
    config.validate()?;
    let addr = config.socket_addr()?;

    // Fail fast on an unusable or too-new database file.
    let db_path = config.db_path.clone();
    tokio::task::spawn_blocking(move || open_db(db_path).map(drop))
        .await
        .map_err(|err| ServeError::Io(std::io::Error::other(err)))??;

    let app = router(app_state(&config), &config.api_prefix);
    let listener = TcpListener::bind(addr).await?;
    info!(
        "event=server_start module=http status=ok addr={} sessions={}",
        listener.local_addr()?,
        config.sessions.len()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=http status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("event=server_stop module=http status=error error={err}");
    }
}
