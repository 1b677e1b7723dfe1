use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tabletop_core::db::open_db;
use tabletop_http::{app_state, router, ServerConfig};
use tempfile::TempDir;
use tower::ServiceExt;

const OWNER: &str = "0123456789abcdef01234567";
const OTHER: &str = "76543210fedcba9876543210";
const OWNER_TOKEN: &str = "owner-token";
const OTHER_TOKEN: &str = "other-token";

struct TestApp {
    _dir: TempDir,
    config: ServerConfig,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig {
            db_path: dir.path().join("games.sqlite3"),
            ..ServerConfig::default()
        };
        config
            .sessions
            .insert(OWNER_TOKEN.to_string(), OWNER.to_string());
        config
            .sessions
            .insert(OTHER_TOKEN.to_string(), OTHER.to_string());
        Self { _dir: dir, config }
    }

    fn router(&self) -> Router {
        router(app_state(&self.config), &self.config.api_prefix)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(format!("/api/v0{path}"))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = body.map_or_else(Body::empty, |value| Body::from(value.to_string()));

        let response = self
            .router()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create_catan(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/game/create",
                Some(OWNER_TOKEN),
                Some(json!({
                    "title": "Catan Tracker",
                    "description": "Tracks Catan victory points"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    fn game_count(&self) -> i64 {
        let conn = open_db(&self.config.db_path).unwrap();
        conn.query_row("SELECT COUNT(*) FROM games;", [], |row| row.get(0))
            .unwrap()
    }
}

#[tokio::test]
async fn create_then_fetch_returns_empty_game() {
    let app = TestApp::new();
    let game_id = app.create_catan().await;
    assert_eq!(game_id.len(), 24);

    let (status, body) = app
        .send(Method::GET, &format!("/game/{game_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["game"]["_id"], game_id.as_str());
    assert_eq!(body["data"]["game"]["ownerId"], OWNER);
    assert_eq!(body["data"]["game"]["containers"], json!([]));
    assert_eq!(body["data"]["game"]["counters"], json!([]));
}

#[tokio::test]
async fn unauthenticated_create_returns_fixed_payload_and_writes_nothing() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/game/create",
            None,
            Some(json!({
                "title": "Catan Tracker",
                "description": "Tracks Catan victory points"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "ok": false, "msg": "Not logged in" }));
    assert_eq!(app.game_count(), 0);
}

#[tokio::test]
async fn create_with_short_title_returns_field_errors() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/game/create",
            Some(OWNER_TOKEN),
            Some(json!({ "title": "Ca", "description": "short" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].starts_with("title:"));
    assert!(errors[1].starts_with("description:"));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/game/create",
            Some(OWNER_TOKEN),
            Some(json!({ "title": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().starts_with("body:"));
}

#[tokio::test]
async fn library_games_are_routed_to_their_own_collection() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/game/create",
            Some(OWNER_TOKEN),
            Some(json!({
                "title": "Catan template",
                "description": "Starting layout for Catan",
                "library": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let game_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(Method::GET, &format!("/game/{game_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/game/{game_id}?library=true"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn owner_can_save_edited_game() {
    let app = TestApp::new();
    let game_id = app.create_catan().await;
    let (_, body) = app
        .send(Method::GET, &format!("/game/{game_id}"), None, None)
        .await;
    let mut game = body["data"]["game"].clone();
    game["containers"] = json!([{
        "id": "b3c1a6f0-3f0e-4a52-9b7e-1d2a3c4b5e6f",
        "label": "Deck",
        "description": "",
        "items": [{
            "id": "c4d2b7a1-4a1f-4b63-8c8f-2e3b4d5c6f70",
            "type": "card",
            "label": "Knight",
            "description": "",
            "statusNote": "",
            "parentItems": [],
            "childItems": [],
            "counters": []
        }],
        "itemType": "card",
        "hidden": true,
        "informedPlayers": [OWNER],
        "orderedItems": ["c4d2b7a1-4a1f-4b63-8c8f-2e3b4d5c6f70", ""]
    }]);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/game/{game_id}/update"),
            Some(OWNER_TOKEN),
            Some(game),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["game"]["revision"], 1);
    assert_eq!(body["data"]["game"]["containers"][0]["label"], "Deck");
    assert_eq!(
        body["data"]["game"]["containers"][0]["items"][0]["label"],
        "Knight"
    );
}

#[tokio::test]
async fn update_checks_login_then_payload_then_owner() {
    let app = TestApp::new();
    let game_id = app.create_catan().await;
    let (_, body) = app
        .send(Method::GET, &format!("/game/{game_id}"), None, None)
        .await;
    let game = body["data"]["game"].clone();
    let path = format!("/game/{game_id}/update");

    let mut invalid = game.clone();
    invalid["title"] = json!("ab");
    let (status, _) = app.send(Method::POST, &path, None, Some(invalid.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(Method::POST, &path, Some(OTHER_TOKEN), Some(invalid))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().starts_with("title:"));

    let (status, body) = app
        .send(Method::POST, &path, Some(OTHER_TOKEN), Some(game))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn update_of_unknown_game_is_not_found() {
    let app = TestApp::new();
    let game_id = app.create_catan().await;
    let (_, body) = app
        .send(Method::GET, &format!("/game/{game_id}"), None, None)
        .await;
    let mut game = body["data"]["game"].clone();
    let missing = "aaaaaaaaaaaaaaaaaaaaaaaa";
    game["_id"] = json!(missing);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/game/{missing}/update"),
            Some(OWNER_TOKEN),
            Some(game),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stale_revision_conflicts() {
    let app = TestApp::new();
    let game_id = app.create_catan().await;
    let (_, body) = app
        .send(Method::GET, &format!("/game/{game_id}"), None, None)
        .await;
    let game = body["data"]["game"].clone();
    let path = format!("/game/{game_id}/update");

    let (status, _) = app
        .send(Method::POST, &path, Some(OWNER_TOKEN), Some(game.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(Method::POST, &path, Some(OWNER_TOKEN), Some(game))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn list_games_returns_only_actor_games() {
    let app = TestApp::new();
    let game_id = app.create_catan().await;

    let (status, _) = app.send(Method::GET, "/games", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(Method::GET, "/games", Some(OWNER_TOKEN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["games"][0]["_id"], game_id.as_str());

    let (_, body) = app
        .send(Method::GET, "/games", Some(OTHER_TOKEN), None)
        .await;
    assert_eq!(body["data"]["games"], json!([]));
}

#[tokio::test]
async fn health_answers_pong() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"pong");
}
