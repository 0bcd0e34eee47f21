//! API key authentication.
//!
//! Keys are opaque strings the store resolves to a user; the client sends
//! the raw key in the `Authorization` header. This is deliberately not a
//! real credential scheme, it only needs to be strong enough for download
//! and authorization flows under test to tell users apart.

use axum::http::HeaderMap;
use tracing::debug;

use crate::errors::ApiError;
use crate::models::User;
use crate::store::Store;

/// Resolve the request's API key to its user, or fail with 401.
pub fn require_api_key(store: &Store, headers: &HeaderMap) -> Result<User, ApiError> {
    let key = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ApiError::MissingApiKey)?;

    match store.user_for_api_key(key) {
        Some(user) => Ok(user),
        None => {
            debug!("unknown API key");
            Err(ApiError::InvalidApiKey)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn seeded_store() -> Store {
        let store = Store::new();
        let user = store.make_user("Alice");
        store.make_api_key(user.id, "key-alice");
        store
    }

    #[test]
    fn missing_header_is_rejected() {
        let store = seeded_store();
        let headers = HeaderMap::new();
        assert!(matches!(
            require_api_key(&store, &headers),
            Err(ApiError::MissingApiKey)
        ));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let store = seeded_store();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("key-mallory"));
        assert!(matches!(
            require_api_key(&store, &headers),
            Err(ApiError::InvalidApiKey)
        ));
    }

    #[test]
    fn valid_key_resolves_user() {
        let store = seeded_store();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("key-alice"));
        let user = require_api_key(&store, &headers).unwrap();
        assert_eq!(user.display_name, "Alice");
    }
}
