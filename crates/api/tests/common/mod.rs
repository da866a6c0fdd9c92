use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use armory_battlenet::api::BattleNetApi;
use armory_battlenet::config::{BattleNetConfig, RateLimitConfig};
use armory_battlenet::identity::IdentityClient;
use armory_battlenet::rate_limit::RateLimiter;
use armory_pipeline::{PgCharacterStore, ProfileService};
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get as get_route;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use armory_api::config::ServerConfig;
use armory_api::router::build_app_router;
use armory_api::state::AppState;

/// Session token the fake identity service accepts for `owner-1`.
pub const SESSION: &str = "good-jwt";

/// Session that resolves to a user but has no linked Battle.net account.
pub const UNLINKED_SESSION: &str = "unlinked-jwt";

const ACCESS_TOKEN: &str = "bnet-token";

/// Build a test `ServerConfig` pointing every upstream at `upstream_url`.
pub fn test_config(upstream_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        enrich_workers: 3,
        battlenet: BattleNetConfig {
            api_url: upstream_url.to_string(),
            namespace: "profile-eu".to_string(),
            locale: "en_GB".to_string(),
            identity_url: upstream_url.to_string(),
            client_timeout: Duration::from_secs(5),
        },
        rate_limit: RateLimitConfig {
            per_second: 1_000,
            burst: 100,
            max_wait: Duration::from_secs(1),
        },
    }
}

/// The application under test plus a view of the traffic it sent upstream.
pub struct TestApp {
    pub router: Router,
    /// Number of roster listings the fake Battle.net served.
    pub roster_calls: Arc<AtomicUsize>,
}

impl TestApp {
    pub fn roster_calls(&self) -> usize {
        self.roster_calls.load(Ordering::SeqCst)
    }
}

/// Build the full application router against a fake identity service and
/// Battle.net API running on a local port.
///
/// The state is wired exactly like `main.rs`: real HTTP clients, the shared
/// limiter and the Postgres-backed store.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    let roster_calls = Arc::new(AtomicUsize::new(0));
    let upstream = spawn_upstream(roster_calls.clone()).await;
    let config = test_config(&upstream);

    let http = armory_battlenet::build_http_client(config.battlenet.client_timeout).unwrap();
    let battlenet = BattleNetApi::new(http.clone(), &config.battlenet).unwrap();
    let identity = IdentityClient::new(http, config.battlenet.identity_url.clone());
    let limiter = Arc::new(RateLimiter::new(&config.rate_limit));

    let profiles = ProfileService::new(
        Arc::new(battlenet),
        PgCharacterStore::new(pool.clone()),
        limiter,
        config.enrich_workers,
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        identity,
        profiles: Arc::new(profiles),
    };

    TestApp {
        router: build_app_router(state, &config),
        roster_calls,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send an unauthenticated GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

/// Send a request carrying `Authorization: Bearer {session}`.
pub async fn send_as(app: Router, method: Method, uri: &str, session: &str) -> Response {
    send(app, method, uri, Some(session)).await
}

async fn send(app: Router, method: Method, uri: &str, session: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header("Authorization", format!("Bearer {session}"));
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fake upstream
// ---------------------------------------------------------------------------

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn auth_user(headers: HeaderMap) -> impl IntoResponse {
    match bearer(&headers) {
        Some(SESSION) => Json(json!({"id": "owner-1", "battletag": "Player#1234"})).into_response(),
        Some(UNLINKED_SESSION) => {
            Json(json!({"id": "owner-2", "battletag": "Lonely#0001"})).into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, "invalid session").into_response(),
    }
}

async fn auth_token(headers: HeaderMap) -> impl IntoResponse {
    match bearer(&headers) {
        Some(SESSION) => Json(json!({"access": ACCESS_TOKEN})).into_response(),
        Some(UNLINKED_SESSION) => Json(json!({"access": ""})).into_response(),
        _ => (StatusCode::FORBIDDEN, "no link").into_response(),
    }
}

async fn roster(
    State(calls): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if bearer(&headers) != Some(ACCESS_TOKEN) {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }
    if query.get("namespace").map(String::as_str) != Some("profile-eu") {
        return (StatusCode::BAD_REQUEST, "missing namespace").into_response();
    }
    calls.fetch_add(1, Ordering::SeqCst);

    Json(json!({
        "wow_accounts": [
            {"characters": [
                {"name": "Thrall", "level": 80,
                 "realm": {"name": "Draenor", "slug": "draenor"},
                 "playable_class": {"name": "Shaman"},
                 "playable_race": {"name": "Orc"},
                 "faction": {"name": "Horde"}}
            ]},
            {"characters": [
                {"name": "Jaina", "level": 80,
                 "realm": {"name": "Kazzak", "slug": "kazzak"},
                 "playable_class": {"name": "Mage"},
                 "playable_race": {"name": "Human"},
                 "faction": {"name": "Alliance"}}
            ]}
        ]
    }))
    .into_response()
}

async fn detail(Path((realm, name)): Path<(String, String)>) -> impl IntoResponse {
    match (realm.as_str(), name.as_str()) {
        ("draenor", "thrall") => Json(json!({
            "active_spec": {"name": "Enhancement"},
            "guild": {"id": 7, "name": "Frostwolf Clan",
                      "realm": {"name": "Draenor", "slug": "draenor"},
                      "faction": {"name": "Horde"}},
            "average_item_level": 620
        }))
        .into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
    }
}

async fn mythic(Path((_realm, name)): Path<(String, String)>) -> impl IntoResponse {
    match name.as_str() {
        "thrall" => Json(json!({"current_mythic_rating": {"rating": 2750.456}})).into_response(),
        _ => (StatusCode::NOT_FOUND, "").into_response(),
    }
}

async fn spawn_upstream(roster_calls: Arc<AtomicUsize>) -> String {
    let app = Router::new()
        .route("/auth/user", get_route(auth_user))
        .route("/auth/blizzard/token", get_route(auth_token))
        .route("/profile/user/wow", get_route(roster))
        .route("/profile/wow/character/{realm}/{name}", get_route(detail))
        .route(
            "/profile/wow/character/{realm}/{name}/mythic-keystone-profile",
            get_route(mythic),
        )
        .with_state(roster_calls);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
