//! Asset delivery: upload downloads, build-file downloads, and the raw
//! `/@cdn` mount, all honoring single-range `Range` requests.
//!
//! Range semantics follow the emulated service: `bytes=<start>-<end>`
//! where a missing or unparseable start defaults to 0 and a missing end
//! defaults to `size - 1`. Only the first specifier of a multi-range
//! header is honored. A range the asset cannot satisfy is a fixture
//! defect and surfaces as a 500, never a silent clamp.

use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::debug;

use super::{find_build, find_upload, parse_id, require_authorized};
use crate::auth::require_api_key;
use crate::errors::ApiError;
use crate::models::{CdnFile, Game, Storage, Upload};
use crate::store::Store;
use crate::AppState;

// -- Range parsing ------------------------------------------------------------

/// Extract `(start, end)` from a Range header value, both inclusive.
/// Missing or unparseable pieces fall back to the full extent.
fn parse_range(value: &str, size: u64) -> (u64, u64) {
    let spec = value.split_once('=').map_or("", |(_, s)| s);
    // Only the first range specifier is honored.
    let first = spec.split(',').next().unwrap_or("").trim();
    let (start_raw, end_raw) = first.split_once('-').unwrap_or((first, ""));

    let start = start_raw.trim().parse::<u64>().unwrap_or(0);
    let end = end_raw
        .trim()
        .parse::<u64>()
        .unwrap_or_else(|_| size.saturating_sub(1));
    (start, end)
}

// -- Streaming ----------------------------------------------------------------

/// Serve a CDN file's bytes, honoring an optional Range header.
pub(crate) fn serve_cdn_asset(file: &CdnFile, headers: &HeaderMap) -> Result<Response, ApiError> {
    let size = file.size;

    let (status, body, content_length, content_range) = match headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
    {
        None => (StatusCode::OK, file.contents.clone(), size, None),
        Some(value) => {
            let (start, end) = parse_range(value, size);
            if start > end || end >= size {
                return Err(ApiError::Internal(anyhow!(
                    "unsatisfiable range {start}-{end} for {size}-byte asset {}",
                    file.filename
                )));
            }
            let body: Bytes = file.contents.slice(start as usize..(end + 1) as usize);
            let content_range = format!("bytes {start}-{end}/{size}");
            (
                StatusCode::PARTIAL_CONTENT,
                body,
                end - start + 1,
                Some(content_range),
            )
        }
    };

    let mut response = (status, body).into_response();
    let hdrs = response.headers_mut();

    hdrs.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    hdrs.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&content_length.to_string()).unwrap(),
    );
    if let Some(ref cr) = content_range {
        hdrs.insert(header::CONTENT_RANGE, HeaderValue::from_str(cr).unwrap());
    }
    hdrs.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    hdrs.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );
    // Asset delivery never reuses the connection.
    hdrs.insert(header::CONNECTION, HeaderValue::from_static("close"));

    debug!("serving {} ({} bytes)", file.filename, content_length);
    Ok(response)
}

/// Fetch the CDN file backing a seeded upload or build file and stream it.
/// A missing blob here means the fixture is inconsistent, so it surfaces
/// as a 500 rather than a 404.
fn serve_stored_asset(store: &Store, path: &str, headers: &HeaderMap) -> Result<Response, ApiError> {
    let file = store
        .cdn_file(path)
        .ok_or_else(|| anyhow!("no CDN file seeded at {path}"))?;
    serve_cdn_asset(&file, headers)
}

/// Owning game of an upload. The store guarantees this edge at seeding
/// time, so absence is an internal fault.
fn owning_game(store: &Store, upload: &Upload) -> Result<Game, ApiError> {
    store.find_game(upload.game_id).ok_or_else(|| {
        anyhow!(
            "upload {} references missing game {}",
            upload.id,
            upload.game_id
        )
        .into()
    })
}

// -- Handlers ------------------------------------------------------------------

/// `GET /uploads/{id}/download` -- deliver an upload's bytes. Hosted
/// uploads stream directly; build uploads stream the head build's
/// `archive/default` file.
pub async fn download_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = require_api_key(&state.store, &headers)?;
    let upload_id = parse_id("id", &id)?;
    let upload = find_upload(&state.store, upload_id)?;
    let game = owning_game(&state.store, &upload)?;
    require_authorized(upload.can_be_downloaded_by(&game, &user))?;

    match &upload.storage {
        Storage::Hosted => serve_stored_asset(&state.store, &upload.cdn_path(), &headers),
        Storage::Build => {
            let head = upload
                .head
                .ok_or_else(|| anyhow!("build upload {} has no head build", upload.id))?;
            let build = find_build(&state.store, head)?;
            let archive =
                build
                    .file("archive", "default")
                    .ok_or_else(|| ApiError::BuildFileNotFound {
                        kind: "archive".to_string(),
                        sub_kind: "default".to_string(),
                    })?;
            serve_stored_asset(&state.store, &archive.cdn_path(), &headers)
        }
        Storage::Other(storage) => Err(ApiError::UnsupportedStorage {
            storage: storage.clone(),
        }),
    }
}

/// `GET /builds/{id}/download/{type}/{subtype}` -- deliver one named file
/// of a build.
pub async fn download_build_file(
    State(state): State<Arc<AppState>>,
    Path((id, kind, sub_kind)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = require_api_key(&state.store, &headers)?;
    let build_id = parse_id("id", &id)?;
    let build = find_build(&state.store, build_id)?;
    let upload = find_upload(&state.store, build.upload_id)?;
    let game = owning_game(&state.store, &upload)?;
    require_authorized(upload.can_be_downloaded_by(&game, &user))?;

    let file = build.file(&kind, &sub_kind).ok_or_else(|| {
        debug!("no {kind}/{sub_kind} build file for build {build_id}");
        ApiError::BuildFileNotFound {
            kind: kind.clone(),
            sub_kind: sub_kind.clone(),
        }
    })?;
    serve_stored_asset(&state.store, &file.cdn_path(), &headers)
}

/// `GET /@cdn/*path` -- unauthenticated catch-all delivery by CDN path.
pub async fn get_cdn_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // The wildcard capture drops the leading slash CDN paths are keyed by.
    let path = format!("/{path}");
    let file = state
        .store
        .cdn_file(&path)
        .ok_or(ApiError::CdnPathNotFound { path })?;
    serve_cdn_asset(&file, &headers)
}
