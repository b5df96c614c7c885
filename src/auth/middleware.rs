use crate::types::{AppError, PublicUser, User};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Identity attached to a request once its bearer token checks out.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub user: PublicUser,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.clone(),
            user: PublicUser::from(user),
        }
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Access denied. No token provided.".to_string()))?;

    let value = value
        .to_str()
        .map_err(|_| AppError::Auth("Access denied. Invalid token format.".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::Auth(
            "Access denied. Invalid token format.".to_string(),
        )),
    }
}

/// Rejects the request with 401 unless it carries a valid token for an
/// existing user. On success a [`CurrentUser`] is stored in the request
/// extensions for later layers and handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).inspect_err(|e| {
        tracing::debug!(path = %req.uri().path(), reason = %e, "auth rejected");
    })?;

    let user = state.auth_service.authenticate(token).await?;

    req.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(req).await)
}

/// Extractor for the authenticated user. Only valid on routes behind
/// [`require_auth`].
pub struct AuthUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Auth("Access denied. No token provided.".to_string()))
    }
}
