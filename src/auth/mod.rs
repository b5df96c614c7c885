//! Authentication and authorization
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id credential hashing
//! - [`auth::jwt`](crate::auth::jwt) - session token issuing and verification
//! - [`auth::service`](crate::auth::service) - register / login / profile workflows
//! - [`auth::middleware`](crate::auth::middleware) - bearer token layer and the [`AuthUser`](middleware::AuthUser) extractor
//! - [`auth::ownership`](crate::auth::ownership) - author-only guard for post mutations
//!
//! # Request pipeline
//!
//! ```text
//! request -> require_auth -> require_post_owner -> extractors (path id, query, body) -> handler
//! ```
//!
//! `require_auth` answers 401 when the `Authorization: Bearer <token>` header
//! is absent, malformed, expired, or names a user that no longer exists.
//! `require_post_owner` then answers 404 for unknown posts and 403 when the
//! requester did not author the post. Body and query rules run last, inside
//! the handler's `ValidatedJson` / `ValidatedQuery` extractors.
//!
//! Tokens are stateless HS256 JWTs. Logout is client side only: the server
//! keeps no session table, so a token stays valid until it expires.
//!
//! # Configuration
//!
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"  # env var holding the signing secret
//! token_ttl_secs = 86400         # one day
//! ```

/// Session token issuing and verification.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Resource ownership checks.
pub mod ownership;
/// Salted one-way password hashing.
pub mod password;
/// Account workflows.
pub mod service;

pub use jwt::{TokenError, TokenService};
pub use middleware::{require_auth, AuthUser, CurrentUser};
pub use ownership::{require_post_owner, OwnedPost};
pub use password::PasswordHasher;
pub use service::AuthService;
