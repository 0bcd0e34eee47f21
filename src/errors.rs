//! API error types.
//!
//! Every variant carries its final HTTP status, and the enum implements
//! [`axum::response::IntoResponse`], so handler bodies are straight-line
//! `?` chains: a failed lookup or authorization check short-circuits deep
//! inside the handler and is rendered exactly once here. The wire shape is
//! always `{"errors": ["<message>", ...]}` with the matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Generate a 16-character hex request ID.
pub fn generate_request_id() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes).to_uppercase()
}

/// Client- and server-visible request failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No `Authorization` header on an API-key-protected route.
    #[error("missing API key")]
    MissingApiKey,

    /// The `Authorization` header does not resolve to a user.
    #[error("invalid API key")]
    InvalidApiKey,

    /// The current user may not perform this action.
    #[error("forbidden")]
    Forbidden,

    /// A path variable that must be an integer was not parseable.
    #[error("invalid value for path parameter {name}")]
    InvalidPathParam { name: String },

    /// The requested game does not exist.
    #[error("game not found: {id}")]
    GameNotFound { id: i64 },

    /// The requested upload does not exist.
    #[error("upload not found: {id}")]
    UploadNotFound { id: i64 },

    /// The requested build does not exist.
    #[error("build not found: {id}")]
    BuildNotFound { id: i64 },

    /// The build has no file for the requested `(kind, sub_kind)` pair.
    #[error("no {kind}/{sub_kind} build file")]
    BuildFileNotFound { kind: String, sub_kind: String },

    /// No CDN file is registered at the requested path.
    #[error("not found")]
    CdnPathNotFound { path: String },

    /// No route matched the request path.
    #[error("invalid api endpoint")]
    NoSuchEndpoint,

    /// The path matched but the method is not mapped.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// An upload with a storage kind the server cannot deliver.
    #[error("unsupported storage: {storage}")]
    UnsupportedStorage { storage: String },

    /// Catch-all for unexpected internal failures. The detail is logged,
    /// never exposed to the client.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// The HTTP status this error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingApiKey | ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidPathParam { .. } => StatusCode::BAD_REQUEST,
            ApiError::GameNotFound { .. }
            | ApiError::UploadNotFound { .. }
            | ApiError::BuildNotFound { .. }
            | ApiError::BuildFileNotFound { .. }
            | ApiError::CdnPathNotFound { .. }
            | ApiError::NoSuchEndpoint => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnsupportedStorage { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal faults get logged with full detail and replaced by a
        // generic message on the wire.
        if let ApiError::Internal(ref cause) = self {
            error!("internal error: {cause:#}");
        }
        if let ApiError::CdnPathNotFound { ref path } = self {
            tracing::debug!("no CDN file at {path}");
        }

        let body = serde_json::json!({ "errors": [self.to_string()] });

        (
            status,
            [("content-type", "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::MissingApiKey.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidApiKey.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::GameNotFound { id: 7 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::UnsupportedStorage {
                storage: "carrier-pigeon".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_message_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("range 10..=600 out of bounds"));
        assert_eq!(err.to_string(), "internal error");
    }

    #[test]
    fn request_id_format() {
        let id = generate_request_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, id.to_uppercase());
    }
}
