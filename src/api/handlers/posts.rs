//! Post handlers.
//!
//! Listing and reading are public. Creating requires a session; updating and
//! deleting also pass through the ownership guard, which hands the loaded
//! post to the handler as [`OwnedPost`].

use crate::{
    auth::{middleware::AuthUser, ownership::OwnedPost},
    types::{
        AppError, CreatePostRequest, MessageResponse, NewPost, PaginationQuery, Pagination,
        PostChanges, PostQuery, PostResponse, PostView, PostsResponse, Result,
        UpdatePostRequest,
    },
    validation::{into_violations, RequestRules, ValidId, ValidatedJson, ValidatedQuery},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};

fn post_query(query: &PaginationQuery, author_id: Option<String>) -> Result<PostQuery> {
    let params = query
        .params()
        .map_err(|errors| AppError::Validation(into_violations(errors, PaginationQuery::FIELDS)))?;

    Ok(PostQuery {
        author_id,
        page: params.page,
        limit: params.limit,
        sort: params.sort,
    })
}

async fn list_page(state: &AppState, query: PostQuery) -> Result<Json<PostsResponse>> {
    let page = state.store.list_posts(&query).await?;

    Ok(Json(PostsResponse {
        success: true,
        posts: page.items.into_iter().map(PostView::from).collect(),
        pagination: Some(Pagination::new(query.page, query.limit, page.total)),
    }))
}

/// All posts, paginated.
pub async fn list_posts(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PaginationQuery>,
) -> Result<Json<PostsResponse>> {
    list_page(&state, post_query(&query, None)?).await
}

/// The caller's own posts, paginated.
pub async fn my_posts(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    ValidatedQuery(query): ValidatedQuery<PaginationQuery>,
) -> Result<Json<PostsResponse>> {
    list_page(&state, post_query(&query, Some(current.id))?).await
}

pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    let post = state
        .store
        .create_post(&NewPost {
            title: payload.title,
            description: payload.description,
            image_url: payload.image_url,
            author_id: current.id,
        })
        .await?;

    tracing::info!(post_id = %post.id, user_id = %post.author_id, "post created");

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            success: true,
            message: Some("Post created successfully".to_string()),
            post: PostView::from(post),
        }),
    ))
}

pub async fn get_post(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<PostResponse>> {
    let post = state
        .store
        .get_post(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(PostResponse {
        success: true,
        message: None,
        post: PostView::from(post),
    }))
}

/// Update a post. Only the author reaches this handler.
pub async fn update_post(
    State(state): State<AppState>,
    OwnedPost(post): OwnedPost,
    ValidatedJson(payload): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>> {
    let changes = PostChanges {
        title: payload.title,
        description: payload.description,
        image_url: payload.image_url,
    };

    let updated = state
        .store
        .update_post(&post.id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    tracing::info!(post_id = %updated.id, user_id = %updated.author_id, "post updated");

    Ok(Json(PostResponse {
        success: true,
        message: Some("Post updated successfully".to_string()),
        post: PostView::from(updated),
    }))
}

/// Delete a post. Only the author reaches this handler.
pub async fn delete_post(
    State(state): State<AppState>,
    OwnedPost(post): OwnedPost,
) -> Result<Json<MessageResponse>> {
    if !state.store.delete_post(&post.id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    tracing::info!(post_id = %post.id, user_id = %post.author_id, "post deleted");

    Ok(Json(MessageResponse::ok("Post deleted successfully")))
}
