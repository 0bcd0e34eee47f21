//! Metadata endpoints: profile, games, uploads, download sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde_json::json;
use uuid::Uuid;

use super::{find_game, parse_id, require_authorized, write_json};
use crate::auth::require_api_key;
use crate::errors::ApiError;
use crate::formatters::{format_game, format_uploads, format_user};
use crate::AppState;

/// `GET /profile` -- the user the API key resolves to.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = require_api_key(&state.store, &headers)?;
    Ok(write_json(json!({ "user": format_user(&user) })))
}

/// `GET /games/{id}` -- a single game, if the current user may view it.
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = require_api_key(&state.store, &headers)?;
    let game_id = parse_id("id", &id)?;
    let game = find_game(&state.store, game_id)?;
    require_authorized(game.can_be_viewed_by(&user))?;
    Ok(write_json(json!({ "game": format_game(&game) })))
}

/// `GET /games/{id}/uploads` -- the game's uploads, ordered by id.
pub async fn list_game_uploads(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = require_api_key(&state.store, &headers)?;
    let game_id = parse_id("id", &id)?;
    let game = find_game(&state.store, game_id)?;
    require_authorized(game.can_be_viewed_by(&user))?;
    let uploads = state.store.list_uploads_by_game(game_id);
    Ok(write_json(json!({ "uploads": format_uploads(&uploads) })))
}

/// `POST /games/{id}/download-sessions` -- mint an opaque session token.
pub async fn create_download_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = require_api_key(&state.store, &headers)?;
    let game_id = parse_id("id", &id)?;
    let game = find_game(&state.store, game_id)?;
    require_authorized(game.can_be_viewed_by(&user))?;
    Ok(write_json(json!({ "uuid": Uuid::new_v4().to_string() })))
}
