//! Public user directory handlers.

use crate::{
    types::{
        AppError, CheckEmailRequest, EmailExistsResponse, PostQuery, PostView, PostsResponse,
        ProfileResponse, PublicUser, Result, SearchQuery, UserProfile, UsersResponse,
    },
    validation::{ValidId, ValidatedJson},
    AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};

/// Maximum number of users returned by a search.
pub const SEARCH_LIMIT: u32 = 20;

/// Public profile with the number of posts the user has written.
pub async fn get_user_profile(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<ProfileResponse>> {
    let user = state
        .store
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let posts_count = state.store.count_posts_by_author(&user.id).await?;

    Ok(Json(ProfileResponse {
        success: true,
        user: UserProfile {
            user: PublicUser::from(user),
            posts_count,
        },
    }))
}

/// Every post by one user, newest first.
pub async fn get_user_posts(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<PostsResponse>> {
    if state.store.get_user_by_id(&id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let page = state
        .store
        .list_posts(&PostQuery {
            author_id: Some(id),
            limit: u32::MAX,
            ..Default::default()
        })
        .await?;

    Ok(Json(PostsResponse {
        success: true,
        posts: page.items.into_iter().map(PostView::from).collect(),
        pagination: None,
    }))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse<UserProfile>>> {
    let users = state
        .store
        .list_users()
        .await?
        .into_iter()
        .map(|(user, posts_count)| UserProfile {
            user: PublicUser::from(user),
            posts_count,
        })
        .collect();

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}

/// Case-insensitive search over names and emails.
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<UsersResponse<PublicUser>>> {
    let q = query.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Err(AppError::InvalidInput("Search query is required".to_string()));
    }

    let users = state
        .store
        .search_users(q, SEARCH_LIMIT)
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}

pub async fn check_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CheckEmailRequest>,
) -> Result<Json<EmailExistsResponse>> {
    let email = payload.email.unwrap_or_default();
    let exists = state.store.email_exists(&email).await?;

    Ok(Json(EmailExistsResponse {
        success: true,
        exists,
    }))
}
