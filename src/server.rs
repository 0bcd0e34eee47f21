//! Axum router construction and route mapping.
//!
//! Exact routes are registered ahead of the `/@cdn` wildcard mount, and an
//! unmatched request falls through to a JSON 404, so every response the
//! server produces -- success or failure -- is well-formed for API clients.
//! A matched path with an unmapped method yields a JSON 405 through each
//! method router's fallback.

use axum::{
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::errors::{generate_request_id, ApiError};
use crate::handlers::{api, cdn};
use crate::AppState;

/// Build the axum [`Router`] with every API route.
///
/// The returned router is ready to be passed to `axum::serve`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/profile",
            get(api::get_profile).fallback(method_not_allowed),
        )
        .route(
            "/games/:id",
            get(api::get_game).fallback(method_not_allowed),
        )
        .route(
            "/games/:id/uploads",
            get(api::list_game_uploads).fallback(method_not_allowed),
        )
        .route(
            "/games/:id/download-sessions",
            post(api::create_download_session).fallback(method_not_allowed),
        )
        .route(
            "/uploads/:id/download",
            get(cdn::download_upload).fallback(method_not_allowed),
        )
        .route(
            "/builds/:id/download/:type/:subtype",
            get(cdn::download_build_file).fallback(method_not_allowed),
        )
        // Catch-all delivery by CDN path, unauthenticated.
        .route(
            "/@cdn/*path",
            get(cdn::get_cdn_file).fallback(method_not_allowed),
        )
        // Anything else is a JSON 404.
        .fallback(no_such_endpoint)
        .with_state(state)
        .layer(middleware::from_fn(common_headers_middleware))
        // Request logging wraps the full lifecycle.
        .layer(TraceLayer::new_for_http())
}

async fn no_such_endpoint() -> ApiError {
    ApiError::NoSuchEndpoint
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Middleware adding common response headers to every response:
/// - `x-request-id`: 16-character uppercase hex string
/// - `Date`: RFC 7231 formatted timestamp
/// - `Server`: `mockcdn`
async fn common_headers_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    if !headers.contains_key("x-request-id") {
        let request_id = generate_request_id();
        headers.insert("x-request-id", HeaderValue::from_str(&request_id).unwrap());
    }

    let date = httpdate::fmt_http_date(std::time::SystemTime::now());
    headers.insert("date", HeaderValue::from_str(&date).unwrap());
    headers.insert("server", HeaderValue::from_static("mockcdn"));

    response
}
