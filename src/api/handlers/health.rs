use crate::types::{AppError, MessageResponse};
use axum::{http::Uri, Json};

pub async fn health() -> Json<MessageResponse> {
    Json(MessageResponse::ok("Server is running!"))
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::ok("Welcome to the Postboard API"))
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route not found - {}", uri.path()))
}
