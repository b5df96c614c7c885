//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Authentication handlers (register, login, profile).
pub mod auth;
/// Health check, welcome and fallback handlers.
pub mod health;
/// Post CRUD handlers.
pub mod posts;
/// Public user directory handlers.
pub mod users;
