//! # Postboard
//!
//! A small social blogging backend: registration and login with stateless
//! session tokens, public profiles, and posts that only their author may
//! change.
//!
//! ## Overview
//!
//! Postboard can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `postboard-server` binary
//! 2. **As a library** - Mount the router in your own axum application
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use postboard::{build_app, AppState, DatabaseProvider, PostboardConfig};
//!
//! let config = PostboardConfig::load("postboard.toml")?;
//! let store = DatabaseProvider::from_url(&config.database.url).create_store().await?;
//! let secret = config.jwt_secret()?;
//! let state = AppState::new(config, store, &secret)?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, build_app(state)).await?;
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - password hashing, session tokens, middleware and ownership guard
//! - [`db`] - store traits and the libsql implementation
//! - [`validation`] - request validation pipeline
//! - [`types`] - domain types, wire shapes and error handling
//! - [`utils`] - TOML configuration
//! - [`cli`] - command-line interface

#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Authentication, sessions and authorization.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Persistence (libsql / SQLite).
pub mod db;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;
/// Request validation rules and extractors.
pub mod validation;

// Re-export commonly used types
pub use auth::AuthService;
pub use db::{DatabaseProvider, SqliteStore, Store};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, PostboardConfig};

use crate::auth::TokenService;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration
    pub config: Arc<PostboardConfig>,
    /// User and post persistence
    pub store: Arc<dyn Store>,
    /// Authentication service
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Wires the services together. The signing secret is resolved by the
    /// caller and only handed to the token service.
    pub fn new(config: PostboardConfig, store: Arc<dyn Store>, jwt_secret: &str) -> Result<Self> {
        let tokens = TokenService::new(jwt_secret, config.auth.token_ttl_secs);
        let auth_service = AuthService::new(
            store.clone(),
            tokens,
            config.profile.default_image.clone(),
        )?;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service: Arc::new(auth_service),
        })
    }
}

/// Full HTTP application: `/` welcome, `/api` routes, a JSON 404 fallback
/// and request tracing.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::handlers::health::root))
        .nest("/api", api::routes::create_router(&state))
        .fallback(api::handlers::health::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
