#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use receiptify::{
    config::Settings,
    management::{Clock, MemorySessionStore, TokenManager, TokenStore},
    spotify::SpotifyClient,
    types::Credential,
};

/// Clock whose time only moves when a test says so.
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(now_ms: i64) -> Arc<Self> {
        Arc::new(FixedClock(AtomicI64::new(now_ms)))
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub const NOW_MS: i64 = 1_700_000_000_000;

/// Canned Spotify accounts service and Web API.
pub struct MockState {
    pub token_calls: AtomicUsize,
    pub token_status: Mutex<u16>,
    pub token_body: Mutex<Value>,
    pub token_delay_ms: AtomicU64,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub token_auth_headers: Mutex<Vec<String>>,
    pub api_calls: AtomicUsize,
    pub api_failures: Mutex<HashMap<String, (u16, String)>>,
    pub bearer_tokens: Mutex<Vec<String>>,
    pub created_playlists: Mutex<Vec<Value>>,
    pub added_chunks: Mutex<Vec<usize>>,
}

impl MockState {
    fn new() -> Self {
        MockState {
            token_calls: AtomicUsize::new(0),
            token_status: Mutex::new(200),
            token_body: Mutex::new(json!({
                "access_token": "fresh-access",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "fresh-refresh",
                "scope": "user-top-read"
            })),
            token_delay_ms: AtomicU64::new(0),
            token_forms: Mutex::new(Vec::new()),
            token_auth_headers: Mutex::new(Vec::new()),
            api_calls: AtomicUsize::new(0),
            api_failures: Mutex::new(HashMap::new()),
            bearer_tokens: Mutex::new(Vec::new()),
            created_playlists: Mutex::new(Vec::new()),
            added_chunks: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_to_token(&self, status: u16, body: Value) {
        *self.token_status.lock().unwrap() = status;
        *self.token_body.lock().unwrap() = body;
    }

    /// Makes every request to `path` (relative to the API root) fail.
    pub fn fail(&self, path: &str, status: u16, body: &str) {
        self.api_failures
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }

    fn record_api(&self, path: &str, headers: &HeaderMap) -> Option<Response> {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.bearer_tokens.lock().unwrap().push(auth.to_string());
        }

        self.api_failures.lock().unwrap().get(path).map(|(status, body)| {
            (
                StatusCode::from_u16(*status).unwrap(),
                body.clone(),
            )
                .into_response()
        })
    }
}

pub struct MockSpotify {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockSpotify {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::new());
        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(me))
            .route("/v1/me/top/tracks", get(top_tracks))
            .route("/v1/me/top/artists", get(top_artists))
            .route("/v1/me/player/recently-played", get(recently_played))
            .route("/v1/me/tracks", get(saved_tracks))
            .route("/v1/users/{user_id}/playlists", post(create_playlist))
            .route("/v1/playlists/{playlist_id}/tracks", post(add_tracks))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockSpotify {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Fully configured settings pointing at this server.
    pub fn settings(&self) -> Settings {
        let base = self.base_url.clone();
        Settings::from_lookup(move |key| match key {
            "SPOTIFY_CLIENT_ID" => Some("client-id".to_string()),
            "SPOTIFY_CLIENT_SECRET" => Some("client-secret".to_string()),
            "SPOTIFY_REDIRECT_URI" => Some("http://127.0.0.1:8888/callback".to_string()),
            "SPOTIFY_API_URL" => Some(format!("{base}/v1")),
            "SPOTIFY_API_TOKEN_URL" => Some(format!("{base}/api/token")),
            "SPOTIFY_API_AUTH_URL" => Some(format!("{base}/authorize")),
            _ => None,
        })
    }

    pub fn token_manager(&self, clock: Arc<FixedClock>) -> Arc<TokenManager> {
        token_manager_with(self.settings(), clock)
    }

    pub fn client(&self, tokens: Arc<TokenManager>) -> SpotifyClient {
        SpotifyClient::new(tokens)
    }
}

pub fn token_manager_with(settings: Settings, clock: Arc<FixedClock>) -> Arc<TokenManager> {
    let store = TokenStore::new(Arc::new(MemorySessionStore::new()));
    Arc::new(TokenManager::new(settings, store).with_clock(clock))
}

pub fn credential(access: &str, refresh: Option<&str>, expires_at_ms: i64) -> Credential {
    Credential {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_at_ms,
    }
}

/// Stores a credential that stays valid for an hour past [`NOW_MS`].
pub async fn log_in(tokens: &TokenManager) {
    tokens
        .store()
        .save(&credential("stored-access", Some("stored-refresh"), NOW_MS + 3_600_000))
        .await
        .unwrap();
}

async fn token(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    state.token_forms.lock().unwrap().push(form);
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.token_auth_headers.lock().unwrap().push(auth.to_string());
    }

    let delay = state.token_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = StatusCode::from_u16(*state.token_status.lock().unwrap()).unwrap();
    let body = state.token_body.lock().unwrap().clone();
    (status, Json(body)).into_response()
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(failure) = state.record_api("/me", &headers) {
        return failure;
    }
    Json(json!({
        "id": "user-1",
        "display_name": "Ada",
        "product": "premium",
        "images": [{ "url": "https://img.example/ada.png" }]
    }))
    .into_response()
}

fn track_json(i: usize) -> Value {
    json!({
        "id": format!("t{i}"),
        "name": format!("Track {i}"),
        "artists": [{ "name": format!("Artist {i}") }],
        "duration_ms": 180_000 + i as u64 * 1000,
        "uri": format!("spotify:track:t{i}"),
        "album": { "images": [] }
    })
}

async fn top_tracks(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(failure) = state.record_api("/me/top/tracks", &headers) {
        return failure;
    }
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    let items: Vec<Value> = (1..=limit).map(track_json).collect();
    Json(json!({ "items": items, "total": limit })).into_response()
}

async fn top_artists(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(failure) = state.record_api("/me/top/artists", &headers) {
        return failure;
    }
    Json(json!({
        "items": [
            {
                "id": "a1",
                "name": "First",
                "genres": ["pop", "rock"],
                "followers": { "total": 1200 },
                "images": [],
                "external_urls": { "spotify": "https://open.spotify.com/artist/a1" }
            },
            {
                "id": "a2",
                "name": "Second",
                "genres": ["pop"],
                "followers": { "total": 30 },
                "images": [],
                "external_urls": { "spotify": "https://open.spotify.com/artist/a2" }
            }
        ],
        "total": 2
    }))
    .into_response()
}

async fn recently_played(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(failure) = state.record_api("/me/player/recently-played", &headers) {
        return failure;
    }
    let items: Vec<Value> = (1..=4)
        .map(|i| {
            json!({
                "track": track_json(i),
                "played_at": format!("2024-03-0{i}T09:30:00Z")
            })
        })
        .collect();
    Json(json!({ "items": items })).into_response()
}

async fn saved_tracks(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(failure) = state.record_api("/me/tracks", &headers) {
        return failure;
    }
    Json(json!({ "items": [], "total": 321 })).into_response()
}

async fn create_playlist(
    State(state): State<Arc<MockState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = state.record_api("/users/playlists", &headers) {
        return failure;
    }
    state.created_playlists.lock().unwrap().push(json!({
        "user_id": user_id,
        "body": body
    }));
    (
        StatusCode::CREATED,
        Json(json!({ "id": "pl-1", "name": body["name"] })),
    )
        .into_response()
}

async fn add_tracks(
    State(state): State<Arc<MockState>>,
    Path(_playlist_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = state.record_api("/playlists/tracks", &headers) {
        return failure;
    }
    let count = body["uris"].as_array().map(Vec::len).unwrap_or(0);
    state.added_chunks.lock().unwrap().push(count);
    (StatusCode::CREATED, Json(json!({ "snapshot_id": "snap" }))).into_response()
}
