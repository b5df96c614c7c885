use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::validation::{
    validate_limit, validate_name_pattern, validate_page, validate_password_present,
    validate_password_strength, validate_post_image, validate_profile_image, validate_sort,
};

/// Profile image assigned to accounts that register without one.
pub const DEFAULT_PROFILE_IMAGE: &str = "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?ixlib=rb-4.0.3&auto=format&fit=crop&w=150&h=150&q=80";

// ============= Domain Types =============

/// A user record as persisted by the store.
///
/// Carries the credential hash, so it is never serialized to clients.
/// Convert to [`PublicUser`] before putting it in a response.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing view of a user with the credential hash stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub profile_image: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            profile_image: user.profile_image.clone(),
            bio: user.bio.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            profile_image: user.profile_image,
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

/// Public profile with the author's post count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: PublicUser,
    pub posts_count: i64,
}

/// Fields required to insert a user. The hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: String,
    pub bio: String,
}

/// Partial update of a user record; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub password_hash: Option<String>,
}


/// A post joined with the author fields shown in listings.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub author_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub author_id: String,
}

/// Partial update of a post. An empty `image_url` clears the image.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Client-facing post shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostView {
    #[serde(rename = "postId")]
    pub post_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userImageUrl")]
    pub user_image_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "postTitle")]
    pub post_title: String,
    #[serde(rename = "postDescription")]
    pub post_description: String,
    #[serde(rename = "postImageUrl")]
    pub post_image_url: Option<String>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.id,
            user_id: post.author_id,
            user_name: post.author_name,
            user_image_url: post.author_image,
            created_at: post.created_at,
            updated_at: post.updated_at,
            post_title: post.title,
            post_description: post.description,
            post_image_url: post.image_url,
        }
    }
}

// ============= Listing Types =============

/// Allowed orderings for post listings. A leading `-` means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    CreatedAsc,
    #[default]
    CreatedDesc,
    TitleAsc,
    TitleDesc,
    UpdatedAsc,
    UpdatedDesc,
}

impl PostSort {
    /// Every accepted query value, in display order.
    pub const VALUES: [&'static str; 6] = [
        "createdAt",
        "-createdAt",
        "title",
        "-title",
        "updatedAt",
        "-updatedAt",
    ];

    /// SQL `ORDER BY` clause for this sort key.
    pub fn order_by(&self) -> &'static str {
        match self {
            PostSort::CreatedAsc => "p.created_at ASC, p.rowid ASC",
            PostSort::CreatedDesc => "p.created_at DESC, p.rowid DESC",
            PostSort::TitleAsc => "p.title ASC, p.rowid DESC",
            PostSort::TitleDesc => "p.title DESC, p.rowid DESC",
            PostSort::UpdatedAsc => "p.updated_at ASC, p.rowid ASC",
            PostSort::UpdatedDesc => "p.updated_at DESC, p.rowid DESC",
        }
    }
}

impl FromStr for PostSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(PostSort::CreatedAsc),
            "-createdAt" => Ok(PostSort::CreatedDesc),
            "title" => Ok(PostSort::TitleAsc),
            "-title" => Ok(PostSort::TitleDesc),
            "updatedAt" => Ok(PostSort::UpdatedAsc),
            "-updatedAt" => Ok(PostSort::UpdatedDesc),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostSort::CreatedAsc => "createdAt",
            PostSort::CreatedDesc => "-createdAt",
            PostSort::TitleAsc => "title",
            PostSort::TitleDesc => "-title",
            PostSort::UpdatedAsc => "updatedAt",
            PostSort::UpdatedDesc => "-updatedAt",
        };
        f.write_str(s)
    }
}

/// Store-level listing query.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub author_id: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub sort: PostSort,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            author_id: None,
            page: 1,
            limit: 10,
            sort: PostSort::default(),
        }
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit_i - 1) / limit_i,
        }
    }
}

// ============= API Request Types =============
//
// Field rules are declared with `validator` attributes. Normalization runs
// first (see `RequestRules::sanitize`), and every rule is evaluated so that
// all violations are reported together.

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 2, max = 50, message = "Full name must be between 2 and 50 characters"))]
    pub full_name: String,
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(
        length(min = 6, max = 20, message = "Password must be between 6 and 20 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    #[validate(custom(function = "validate_profile_image"))]
    pub profile_image: Option<String>,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters"),
        custom(function = "validate_password_present")
    )]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 2, max = 50, message = "Full name must be between 2 and 50 characters"),
        custom(function = "validate_name_pattern")
    )]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_profile_image"))]
    pub profile_image: Option<String>,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    pub bio: Option<String>,
    /// New plaintext password. The stored hash only changes when this is set.
    #[validate(
        length(min = 6, max = 20, message = "Password must be between 6 and 20 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default, alias = "postTitle")]
    #[validate(length(min = 3, max = 200, message = "Post title must be between 3 and 200 characters"))]
    pub title: String,
    #[serde(default, alias = "postDescription")]
    #[validate(length(min = 10, max = 2000, message = "Post description must be between 10 and 2000 characters"))]
    pub description: String,
    #[serde(alias = "postImageUrl")]
    #[validate(custom(function = "validate_post_image"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(alias = "postTitle")]
    #[validate(length(min = 3, max = 200, message = "Post title must be between 3 and 200 characters"))]
    pub title: Option<String>,
    #[serde(alias = "postDescription")]
    #[validate(length(min = 10, max = 2000, message = "Post description must be between 10 and 2000 characters"))]
    pub description: Option<String>,
    #[serde(alias = "postImageUrl")]
    #[validate(custom(function = "validate_post_image"))]
    pub image_url: Option<String>,
}

/// Raw pagination query. Values stay strings so that malformed numbers are
/// reported as field violations instead of extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PaginationQuery {
    #[validate(custom(function = "validate_page"))]
    pub page: Option<String>,
    #[validate(custom(function = "validate_limit"))]
    pub limit: Option<String>,
    #[validate(custom(function = "validate_sort"))]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Only presence is checked; a malformed address simply does not exist.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CheckEmailRequest {
    #[validate(required(message = "Email is required"))]
    pub email: Option<String>,
}

// ============= API Response Types =============

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse<T> {
    pub success: bool,
    pub users: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub post: PostView,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub success: bool,
    pub posts: Vec<PostView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmailExistsResponse {
    pub success: bool,
    pub exists: bool,
}

// ============= Authentication Types =============

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User identifier the token is bound to
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// ============= Error Types =============

/// One failed field rule in a rejected request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
    pub value: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldViolation>>,
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let body = match self {
            AppError::Validation(violations) => ErrorBody {
                success: false,
                message: "Validation failed".to_string(),
                errors: Some(violations),
            },
            AppError::Database(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed with internal error");
                ErrorBody {
                    success: false,
                    message: "Internal server error".to_string(),
                    errors: None,
                }
            }
            AppError::InvalidInput(msg)
            | AppError::Conflict(msg)
            | AppError::Auth(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => ErrorBody {
                success: false,
                message: msg,
                errors: None,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Validation(vec![]).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("dup".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth("no token".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("gone".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_user_has_no_credential_field() {
        let now = Utc::now();
        let user = User {
            id: "u1".into(),
            full_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            profile_image: DEFAULT_PROFILE_IMAGE.into(),
            bio: String::new(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(PublicUser::from(&user)).expect("serializes");
        assert_eq!(json["fullName"], "Jane Doe");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_post_sort_round_trips_all_values() {
        for value in PostSort::VALUES {
            let sort: PostSort = value.parse().expect("known sort key");
            assert_eq!(sort.to_string(), value);
        }
        assert!("name".parse::<PostSort>().is_err());
        assert_eq!(PostSort::default(), PostSort::CreatedDesc);
    }

    #[test]
    fn test_pagination_total_pages() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(2, 10, 11).total_pages, 2);
    }

    #[test]
    fn test_create_post_accepts_legacy_field_names() {
        let req: CreatePostRequest = serde_json::from_value(serde_json::json!({
            "postTitle": "Hello",
            "postDescription": "A longer description",
            "postImageUrl": "https://example.com/a.png"
        }))
        .expect("deserializes");

        assert_eq!(req.title, "Hello");
        assert_eq!(req.description, "A longer description");
        assert_eq!(req.image_url.as_deref(), Some("https://example.com/a.png"));
    }
}
