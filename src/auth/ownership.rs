use crate::auth::middleware::CurrentUser;
use crate::db::Store;
use crate::types::{AppError, Post, Result};
use crate::validation::ValidId;
use crate::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// A resource with a single recorded author.
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
}

impl OwnedResource for Post {
    fn owner_id(&self) -> &str {
        &self.author_id
    }
}

/// Finds a resource by id for the ownership check.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    type Resource: OwnedResource + Send;

    /// Name used in the not-found message, e.g. "Post".
    const KIND: &'static str;

    async fn find(&self, id: &str) -> Result<Option<Self::Resource>>;
}

/// Outcome of an ownership check.
#[derive(Debug)]
pub enum GuardDecision<R> {
    Allow(R),
    NotFound,
    Forbidden,
}

impl<R> GuardDecision<R> {
    /// Converts a denial into the matching API error.
    pub fn into_result(self, kind: &str) -> Result<R> {
        match self {
            GuardDecision::Allow(resource) => Ok(resource),
            GuardDecision::NotFound => Err(AppError::NotFound(format!("{} not found", kind))),
            GuardDecision::Forbidden => Err(AppError::Forbidden(
                "Not authorized to perform this action".to_string(),
            )),
        }
    }
}

/// Compares the resource's author with the requester.
pub async fn guard<L>(
    lookup: &L,
    resource_id: &str,
    requester_id: &str,
) -> Result<GuardDecision<L::Resource>>
where
    L: ResourceLookup,
{
    let decision = match lookup.find(resource_id).await? {
        None => GuardDecision::NotFound,
        Some(resource) if resource.owner_id() != requester_id => GuardDecision::Forbidden,
        Some(resource) => GuardDecision::Allow(resource),
    };

    Ok(decision)
}

/// Post lookup backed by the store.
pub struct PostLookup(pub Arc<dyn Store>);

#[async_trait]
impl ResourceLookup for PostLookup {
    type Resource = Post;

    const KIND: &'static str = "Post";

    async fn find(&self, id: &str) -> Result<Option<Post>> {
        self.0.get_post(id).await
    }
}

/// The post a request was authorized to mutate.
#[derive(Debug, Clone)]
pub struct OwnedPost(pub Post);

impl<S> FromRequestParts<S> for OwnedPost
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<OwnedPost>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Ownership guard did not run".to_string()))
    }
}

/// Route layer that lets the request through only when the authenticated
/// user authored the post named by the `{id}` path segment. A malformed id
/// is rejected before the lookup. Must be layered inside [`require_auth`](crate::auth::middleware::require_auth).
pub async fn require_post_owner(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let requester = req
        .extensions()
        .get::<CurrentUser>()
        .map(|current| current.id.clone())
        .ok_or_else(|| AppError::Auth("Access denied. No token provided.".to_string()))?;

    let lookup = PostLookup(state.store.clone());
    let decision = guard(&lookup, &id, &requester).await?;

    if matches!(decision, GuardDecision::Forbidden) {
        tracing::warn!(post_id = %id, user_id = %requester, "ownership check failed");
    }

    let post = decision.into_result(PostLookup::KIND)?;
    req.extensions_mut().insert(OwnedPost(post));

    Ok(next.run(req).await)
}
