//! mockcdn library -- in-memory content-distribution API server.
//!
//! This crate provides an HTTP test double for a content-distribution
//! backend: metadata endpoints for games, uploads, and builds, plus
//! Range-aware binary asset delivery, all backed by a deterministic
//! in-memory store seeded before serving begins.

pub mod auth;
pub mod config;
pub mod errors;
pub mod formatters;
pub mod handlers;
pub mod models;
pub mod server;
pub mod store;

/// Shared application state passed to all handlers via `axum::extract::State`.
pub struct AppState {
    /// Entity store, seeded before serving and read-only afterwards.
    pub store: store::Store,
}
