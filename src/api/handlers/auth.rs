//! Account handlers: registration, login, session and profile.

use crate::{
    auth::middleware::AuthUser,
    types::{
        AppError, AuthResponse, LoginRequest, MessageResponse, PublicUser, RegisterRequest,
        Result, UpdateProfileRequest, UserResponse,
    },
    validation::ValidatedJson,
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};

/// Register a new user.
///
/// Responds 201 with the public user and a session token. A duplicate email
/// (case-insensitive) is a 400.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (user, token) = state.auth_service.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user: PublicUser::from(user),
            token,
        }),
    ))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (user, token) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        user: PublicUser::from(user),
        token,
    }))
}

/// Current user. Also served as `/auth/verify-token`.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> Result<Json<UserResponse>> {
    // re-read: the account may have gone since the middleware ran
    let user = state
        .store
        .get_user_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        success: true,
        message: None,
        user: PublicUser::from(user),
    }))
}

/// Tokens are stateless, so logging out only tells the client to drop its
/// copy.
pub async fn logout(AuthUser(current): AuthUser) -> Json<MessageResponse> {
    tracing::info!(user_id = %current.id, "user logged out");
    Json(MessageResponse::ok("Logout successful"))
}

/// Update the caller's profile. A new password is hashed before it is stored.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    let user = state
        .auth_service
        .update_profile(&current.id, payload)
        .await?;

    Ok(Json(UserResponse {
        success: true,
        message: Some("Profile updated successfully".to_string()),
        user: PublicUser::from(user),
    }))
}
