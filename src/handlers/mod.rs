//! Request handlers.
//!
//! The helpers here are the per-request vocabulary the handlers share:
//! typed path variables, lookup-or-404, authorize-or-403, and JSON
//! responses. Each returns `Result<_, ApiError>` so handler bodies read
//! as straight-line happy paths.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::errors::ApiError;
use crate::models::{Build, Game, Upload};
use crate::store::Store;

pub mod api;
pub mod cdn;

/// Parse an integer path variable, failing with 400.
pub(crate) fn parse_id(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidPathParam {
        name: name.to_string(),
    })
}

pub(crate) fn find_game(store: &Store, id: i64) -> Result<Game, ApiError> {
    store.find_game(id).ok_or(ApiError::GameNotFound { id })
}

pub(crate) fn find_upload(store: &Store, id: i64) -> Result<Upload, ApiError> {
    store.find_upload(id).ok_or(ApiError::UploadNotFound { id })
}

pub(crate) fn find_build(store: &Store, id: i64) -> Result<Build, ApiError> {
    store.find_build(id).ok_or(ApiError::BuildNotFound { id })
}

/// Fail with 403 unless the caller-evaluated predicate holds.
pub(crate) fn require_authorized(authorized: bool) -> Result<(), ApiError> {
    if authorized {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// 200 response with a JSON body.
pub(crate) fn write_json(payload: Value) -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        payload.to_string(),
    )
        .into_response()
}
