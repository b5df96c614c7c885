//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for Postboard, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/auth`)
//! - `POST /api/auth/register` - Register and receive a session token
//! - `POST /api/auth/login` - Login and receive a session token
//! - `POST /api/auth/logout` - Client-side logout acknowledgement
//! - `GET /api/auth/me`, `GET /api/auth/verify-token` - Current user
//! - `PUT /api/auth/profile` - Update name, image, bio or password
//!
//! ## Posts (`/api/posts`)
//! - `GET /api/posts` - Paginated listing (`page`, `limit`, `sort`)
//! - `GET /api/posts/my-posts` - The caller's posts
//! - `POST /api/posts` - Create a post
//! - `GET /api/posts/{id}` - Read a post
//! - `PUT /api/posts/{id}` - Update a post (author only)
//! - `DELETE /api/posts/{id}` - Delete a post (author only)
//!
//! ## Users (`/api/users`)
//! - `GET /api/users` - All users with post counts
//! - `GET /api/users/search?q=` - Search by name or email
//! - `POST /api/users/check-email` - Whether an email is registered
//! - `GET /api/users/{id}` - Public profile
//! - `GET /api/users/{id}/posts` - A user's posts
//!
//! ## Health (`/api/health`)
//! - `GET /api/health` - Health check endpoint
//!
//! # Authentication
//!
//! Protected endpoints require a session token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! Every response body carries `success`; errors add `message` and, for
//! validation failures, an `errors` list of `{field, message, value}`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
