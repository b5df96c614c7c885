use crate::api::handlers::{auth, health, posts, users};
use crate::auth::{require_auth, require_post_owner};
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

/// Builds the `/api` routes.
///
/// Guards are attached per method with `route_layer`, so public and
/// protected methods can share a path. The last layer added runs first:
/// `require_auth` always precedes `require_post_owner`.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let auth_layer = || middleware::from_fn_with_state(state.clone(), require_auth);
    let owner_layer = || middleware::from_fn_with_state(state.clone(), require_post_owner);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout).route_layer(auth_layer()))
        .route("/me", get(auth::me).route_layer(auth_layer()))
        .route("/verify-token", get(auth::me).route_layer(auth_layer()))
        .route(
            "/profile",
            put(auth::update_profile).route_layer(auth_layer()),
        );

    let post_routes = Router::new()
        .route(
            "/",
            get(posts::list_posts).merge(post(posts::create_post).route_layer(auth_layer())),
        )
        .route(
            "/my-posts",
            get(posts::my_posts).route_layer(auth_layer()),
        )
        .route(
            "/{id}",
            get(posts::get_post).merge(
                put(posts::update_post)
                    .delete(posts::delete_post)
                    .route_layer(owner_layer())
                    .route_layer(auth_layer()),
            ),
        );

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/search", get(users::search_users))
        .route("/check-email", post(users::check_email))
        .route("/{id}", get(users::get_user_profile))
        .route("/{id}/posts", get(users::get_user_posts));

    Router::new()
        .route("/health", get(health::health))
        .nest("/auth", auth_routes)
        .nest("/posts", post_routes)
        .nest("/users", user_routes)
}
