//! HTTP route handlers.
//!
//! All handlers are thin - they delegate to services for business logic.
//! Everything under `/api` except session registration and the event stream
//! requires `Authorization: Bearer <session token>`.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::response::{api_created, api_ok, api_success};
use crate::api::AppState;
use crate::constants::SERVICE_ID;
use crate::error::{LobbyError, LobbyResult};
use crate::player::VirtualPlayer;
use crate::provider::SpotifyClient;
use crate::services::Session;

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts the session token from an `Authorization: Bearer` header.
fn bearer_token(headers: &HeaderMap) -> LobbyResult<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| LobbyError::Unauthorized("missing bearer token".into()))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> LobbyResult<Session> {
    state.sessions.resolve(bearer_token(headers)?)
}

/// Authenticates the caller and looks up the player.
fn authorized_player(
    state: &AppState,
    headers: &HeaderMap,
    player_id: &str,
) -> LobbyResult<Arc<VirtualPlayer>> {
    authenticate(state, headers)?;
    state.registry.require(player_id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest {
    user_id: String,
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    participant_id: Option<String>,
    lobby_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueueRequest {
    track_id: String,
}

#[derive(Deserialize)]
struct JumpRequest {
    position: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceRequest {
    device_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/sessions", post(create_session).delete(delete_session))
        .route("/api/lobbies", post(create_lobby))
        .route("/api/lobbies/search", get(search_lobbies))
        .route("/api/lobbies/{id}", get(get_lobby).delete(close_lobby))
        .route("/api/lobbies/{id}/version", get(get_lobby_version))
        .route("/api/lobbies/{id}/join", post(join_lobby))
        .route("/api/lobbies/{id}/leave", post(leave_lobby))
        .route("/api/players/{id}", get(get_player))
        .route("/api/players/{id}/version", get(get_player_version))
        .route("/api/players/{id}/queue", post(queue_track))
        .route("/api/players/{id}/resume", post(resume))
        .route("/api/players/{id}/pause", post(pause))
        .route("/api/players/{id}/next", post(next))
        .route("/api/players/{id}/previous", post(previous))
        .route("/api/players/{id}/jump", post(jump))
        .route("/api/players/{id}/device", post(select_device))
        .route("/api/events", get(event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe with live object counts.
async fn health_check(State(state): State<AppState>) -> LobbyResult<impl IntoResponse> {
    let lobbies = state.lobby_service.count().await?;
    Ok(api_success(json!({
        "status": "ok",
        "service": SERVICE_ID,
        "players": state.registry.len(),
        "lobbies": lobbies,
        "sessions": state.sessions.len(),
    })))
}

/// Registers a streaming access token and returns a session token for it.
async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> LobbyResult<impl IntoResponse> {
    if payload.user_id.is_empty() || payload.access_token.is_empty() {
        return Err(LobbyError::InvalidRequest(
            "userId and accessToken are required".into(),
        ));
    }

    let base_url = state.config.read().spotify_api_base_url.clone();
    let client = Arc::new(SpotifyClient::new(
        state.http_client.clone(),
        base_url,
        payload.access_token,
    ));
    let token = state.sessions.register(payload.user_id.clone(), client);

    Ok(api_created(json!({
        "sessionToken": token,
        "userId": payload.user_id,
    })))
}

async fn delete_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> LobbyResult<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    if !state.sessions.revoke(token) {
        return Err(LobbyError::Unauthorized("unknown session token".into()));
    }
    Ok(api_ok())
}

async fn create_lobby(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> LobbyResult<impl IntoResponse> {
    let session = authenticate(&state, &headers)?;
    let lobby = state.lobby_service.create_lobby(&session).await?;
    Ok(api_created(lobby))
}

async fn search_lobbies(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> LobbyResult<impl IntoResponse> {
    authenticate(&state, &headers)?;
    let lobby_id = state
        .lobby_service
        .search(query.participant_id.as_deref(), query.lobby_id.as_deref())
        .await?;
    Ok(api_success(json!({ "lobbyId": lobby_id })))
}

async fn get_lobby(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    authenticate(&state, &headers)?;
    let lobby = state.lobby_service.get(&id).await?;
    Ok(api_success(lobby))
}

/// Returns the lobby version, `-1` once the lobby is gone.
async fn get_lobby_version(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    authenticate(&state, &headers)?;
    let version = state.lobby_service.version(&id).await?;
    Ok(api_success(json!({ "version": version })))
}

async fn join_lobby(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let session = authenticate(&state, &headers)?;
    let lobby = state.lobby_service.join(&id, &session.user_id).await?;
    Ok(api_success(lobby))
}

async fn leave_lobby(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let session = authenticate(&state, &headers)?;
    let lobby = state.lobby_service.leave(&id, &session.user_id).await?;
    Ok(api_success(lobby))
}

async fn close_lobby(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    authenticate(&state, &headers)?;
    state.lobby_service.close(&id).await?;
    Ok(api_ok())
}

async fn get_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    Ok(api_success(player.snapshot()))
}

async fn get_player_version(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    Ok(api_success(json!({ "version": player.version() })))
}

async fn queue_track(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<QueueRequest>,
) -> LobbyResult<impl IntoResponse> {
    let session = authenticate(&state, &headers)?;
    let song = state
        .lobby_service
        .queue_track(&id, &session, &payload.track_id)
        .await?;
    Ok(api_success(song))
}

async fn resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    player.resume().await;
    Ok(api_success(player.snapshot()))
}

async fn pause(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    player.pause().await;
    Ok(api_success(player.snapshot()))
}

async fn next(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    player.next().await;
    Ok(api_success(player.snapshot()))
}

async fn previous(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    player.previous().await;
    Ok(api_success(player.snapshot()))
}

async fn jump(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<JumpRequest>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    player.jump(payload.position).await;
    Ok(api_success(player.snapshot()))
}

async fn select_device(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<DeviceRequest>,
) -> LobbyResult<impl IntoResponse> {
    let player = authorized_player(&state, &headers, &id)?;
    player.select_device(&payload.device_id).await;
    Ok(api_success(player.snapshot()))
}

/// Streams player and lobby events as server-sent events.
///
/// Lagging clients silently miss events; they resynchronize by comparing
/// versions on the next event they receive.
async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    log::debug!("[Server] SSE client connected");

    let stream = BroadcastStream::new(state.event_bridge.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(data) => Some(Ok(Event::default().data(data))),
                Err(e) => {
                    log::warn!("[Server] Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                log::debug!("[Server] SSE stream lagged: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap_services;
    use crate::provider::test_fixtures::MockProvider;
    use crate::state::Config;
    use axum::http::{HeaderValue, StatusCode};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn app_state() -> AppState {
        let config = Config::default();
        let services = bootstrap_services(&config).unwrap();
        AppState::new(&services, config)
    }

    #[test]
    fn bearer_token_is_extracted() {
        let headers = headers_with("Bearer abc-123");
        assert_eq!(bearer_token(&headers).unwrap(), "abc-123");
    }

    #[test]
    fn missing_or_malformed_token_is_unauthorized() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(LobbyError::Unauthorized(_))
        ));
        assert!(bearer_token(&headers_with("Basic abc")).is_err());
        assert!(bearer_token(&headers_with("Bearer   ")).is_err());
    }

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let state = app_state();
        let result = create_lobby(State(state), headers_with("Bearer nope")).await;
        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_player_is_not_found() {
        let state = app_state();
        let token = state
            .sessions
            .register("alice", Arc::new(MockProvider::new()));
        let headers = headers_with(&format!("Bearer {}", token));

        let response = get_player(State(state), headers, Path("missing".into()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn closed_lobby_reports_deleted_version() {
        let state = app_state();
        let token = state
            .sessions
            .register("alice", Arc::new(MockProvider::new()));
        let headers = headers_with(&format!("Bearer {}", token));

        let response = get_lobby_version(State(state), headers, Path("gone".into()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_session_request_is_invalid() {
        let state = app_state();
        let payload = SessionRequest {
            user_id: String::new(),
            access_token: "token".into(),
        };
        let response = create_session(State(state), Json(payload))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
