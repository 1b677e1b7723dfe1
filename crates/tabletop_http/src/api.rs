//! JSON game API.
//!
//! # Responsibility
//! - Translate HTTP requests into game service calls.
//! - Render every outcome as the `{ok, data | errors | msg}` envelope.
//!
//! # Invariants
//! - Mutating routes check the actor before looking at the payload.
//! - Each request opens its own connection on a blocking worker; handlers
//!   share no game state.
//! - Internal failures are logged with detail and answered generically.

use crate::session::ActorResolver;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tabletop_core::db::open_db;
use tabletop_core::{
    CreateGameRequest, DocumentId, Game, GameCollection, GameService, GameServiceError,
    SqliteGameRepository, ValidationLimits,
};

pub const NOT_LOGGED_IN_MSG: &str = "Not logged in";

/// Shared, read-only handler context.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    sessions: Arc<dyn ActorResolver>,
    limits: ValidationLimits,
}

impl AppState {
    pub fn new(
        db_path: impl Into<PathBuf>,
        sessions: Arc<dyn ActorResolver>,
        limits: ValidationLimits,
    ) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            sessions,
            limits,
        }
    }

    fn actor(&self, headers: &HeaderMap) -> Option<DocumentId> {
        self.sessions.resolve(headers)
    }
}

/// Response envelope shared by every JSON route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            errors: None,
            msg: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedGame {
    pub id: DocumentId,
}

#[derive(Debug, Serialize)]
pub struct GamePayload {
    pub game: Game,
}

#[derive(Debug, Serialize)]
pub struct GamesPayload {
    pub games: Vec<Game>,
}

/// `?library=true` routes a read or save to the template library.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    pub library: Option<bool>,
}

impl CollectionQuery {
    fn collection(&self) -> GameCollection {
        GameCollection::from_library_flag(self.library)
    }
}

/// Failed request, rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    body: ApiResponse<()>,
}

impl ApiError {
    fn with_errors(status: StatusCode, errors: Vec<String>) -> Self {
        Self {
            status,
            body: ApiResponse {
                ok: false,
                data: None,
                errors: Some(errors),
                msg: None,
            },
        }
    }

    fn not_logged_in() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ApiResponse {
                ok: false,
                data: None,
                errors: None,
                msg: Some(NOT_LOGGED_IN_MSG.to_string()),
            },
        }
    }

    fn internal() -> Self {
        Self::with_errors(
            StatusCode::INTERNAL_SERVER_ERROR,
            vec!["internal error".to_string()],
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<GameServiceError> for ApiError {
    fn from(value: GameServiceError) -> Self {
        match value {
            GameServiceError::Unauthenticated => Self::not_logged_in(),
            GameServiceError::Validation(errors) => {
                Self::with_errors(StatusCode::BAD_REQUEST, errors.messages())
            }
            err @ GameServiceError::Forbidden { .. } => {
                Self::with_errors(StatusCode::FORBIDDEN, vec![err.to_string()])
            }
            err @ GameServiceError::GameNotFound(_) => {
                Self::with_errors(StatusCode::NOT_FOUND, vec![err.to_string()])
            }
            err @ GameServiceError::RevisionConflict { .. } => {
                Self::with_errors(StatusCode::CONFLICT, vec![err.to_string()])
            }
            err @ (GameServiceError::Repo(_) | GameServiceError::InconsistentState(_)) => {
                error!("event=api_request module=api status=error error={err}");
                Self::internal()
            }
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// `POST /game/create`
pub async fn create_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<CreatedGame> {
    let actor = state.actor(&headers).ok_or_else(ApiError::not_logged_in)?;
    let request: CreateGameRequest = parse_body(&body)?;
    let collection = GameCollection::from_library_flag(request.library);

    let id = with_game_service(&state, collection, move |service| {
        service.create_game(Some(actor.as_str()), &request)
    })
    .await?;
    info!(
        "event=api_request module=api route=game_create status=ok collection={}",
        collection.as_str()
    );
    Ok(Json(ApiResponse::success(CreatedGame { id })))
}

/// `POST /game/{id}/update`
pub async fn update_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(query): Query<CollectionQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<GamePayload> {
    let actor = state.actor(&headers).ok_or_else(ApiError::not_logged_in)?;
    let game: Game = parse_body(&body)?;

    let game = with_game_service(&state, query.collection(), move |service| {
        service.update_game(Some(actor.as_str()), &game_id, game)
    })
    .await?;
    info!(
        "event=api_request module=api route=game_update status=ok game_id={}",
        game.id
    );
    Ok(Json(ApiResponse::success(GamePayload { game })))
}

/// `GET /game/{id}`
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(query): Query<CollectionQuery>,
) -> ApiResult<GamePayload> {
    let game = with_game_service(&state, query.collection(), move |service| {
        service.get_game(&game_id)
    })
    .await?;
    Ok(Json(ApiResponse::success(GamePayload { game })))
}

/// `GET /games`
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<CollectionQuery>,
    headers: HeaderMap,
) -> ApiResult<GamesPayload> {
    let actor = state.actor(&headers).ok_or_else(ApiError::not_logged_in)?;
    let games = with_game_service(&state, query.collection(), move |service| {
        service.list_owned(Some(actor.as_str()))
    })
    .await?;
    Ok(Json(ApiResponse::success(GamesPayload { games })))
}

/// `GET /healthz`
pub async fn health() -> &'static str {
    tabletop_core::ping()
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        warn!("event=api_request module=api status=rejected reason=malformed_body");
        ApiError::with_errors(StatusCode::BAD_REQUEST, vec![format!("body: {err}")])
    })
}

async fn with_game_service<T, F>(
    state: &AppState,
    collection: GameCollection,
    f: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(
            &mut GameService<SqliteGameRepository<'_>>,
        ) -> Result<T, GameServiceError>
        + Send
        + 'static,
{
    let db_path = Arc::clone(&state.db_path);
    let limits = state.limits;

    let joined = tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
        let mut conn = open_db(db_path.as_path()).map_err(|err| {
            error!("event=api_request module=api status=error error_code=db_open_failed error={err}");
            ApiError::internal()
        })?;
        let repo = SqliteGameRepository::try_new(&mut conn, collection)
            .map_err(GameServiceError::from)?;
        let mut service = GameService::with_limits(repo, limits);
        f(&mut service).map_err(ApiError::from)
    })
    .await;

    joined.unwrap_or_else(|err| {
        error!("event=api_request module=api status=error error_code=worker_failed error={err}");
        Err(ApiError::internal())
    })
}
