//! Normalization and request-specific rules.
//!
//! Field rules live on the request types as `#[validate(...)]` attributes.
//! This module holds what those attributes cannot express on their own:
//! the `sanitize` step for each type, the custom functions whose messages
//! name a particular field, and the resolution of pagination defaults.

use super::{check_int_range, check_one_of, check_url, violation, RequestRules};
use crate::types::{
    CheckEmailRequest, CreatePostRequest, LoginRequest, PaginationQuery, PostSort,
    RegisterRequest, UpdatePostRequest, UpdateProfileRequest,
};
use validator::{Validate, ValidationError, ValidationErrors};

pub const MAX_PAGE: u32 = 1000;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

const PAGE_RANGE: &str = "Page must be a positive integer between 1 and 1000";
const LIMIT_RANGE: &str = "Limit must be between 1 and 100";

pub fn validate_profile_image(value: &str) -> Result<(), ValidationError> {
    check_url(value, "Profile image must be a valid URL")
}

pub fn validate_post_image(value: &str) -> Result<(), ValidationError> {
    check_url(value, "Post image must be a valid URL")
}

pub fn validate_password_present(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(violation("required", "Password is required", value));
    }
    Ok(())
}

pub fn validate_page(raw: &str) -> Result<(), ValidationError> {
    check_int_range(raw, 1, MAX_PAGE, PAGE_RANGE).map(|_| ())
}

pub fn validate_limit(raw: &str) -> Result<(), ValidationError> {
    check_int_range(raw, 1, MAX_LIMIT, LIMIT_RANGE).map(|_| ())
}

pub fn validate_sort(raw: &str) -> Result<(), ValidationError> {
    check_one_of(raw, &PostSort::VALUES, "Invalid sort field")
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_option(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim_in_place(v);
    }
}

// ============= Accounts =============

impl RequestRules for RegisterRequest {
    const FIELDS: &'static [&'static str] =
        &["fullName", "email", "password", "profileImage", "bio"];

    fn sanitize(&mut self) {
        trim_in_place(&mut self.full_name);
        self.email = self.email.trim().to_lowercase();
        trim_option(&mut self.profile_image);
        trim_option(&mut self.bio);
    }
}

impl RequestRules for LoginRequest {
    const FIELDS: &'static [&'static str] = &["email", "password"];

    fn sanitize(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }
}

impl RequestRules for UpdateProfileRequest {
    const FIELDS: &'static [&'static str] = &["fullName", "profileImage", "bio", "password"];

    fn sanitize(&mut self) {
        trim_option(&mut self.full_name);
        trim_option(&mut self.bio);
        trim_option(&mut self.profile_image);
        // an empty image keeps the current one
        if self.profile_image.as_deref() == Some("") {
            self.profile_image = None;
        }
    }
}

impl RequestRules for CheckEmailRequest {
    const FIELDS: &'static [&'static str] = &["email"];

    fn sanitize(&mut self) {
        self.email = self
            .email
            .take()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty());
    }
}

// ============= Posts =============

impl RequestRules for CreatePostRequest {
    const FIELDS: &'static [&'static str] = &["title", "description", "imageUrl"];

    fn sanitize(&mut self) {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.description);
        trim_option(&mut self.image_url);
        if self.image_url.as_deref() == Some("") {
            self.image_url = None;
        }
    }
}

impl RequestRules for UpdatePostRequest {
    const FIELDS: &'static [&'static str] = &["title", "description", "imageUrl"];

    fn sanitize(&mut self) {
        trim_option(&mut self.title);
        trim_option(&mut self.description);
        trim_option(&mut self.image_url);
    }
}

// ============= Listings =============

/// Pagination after validation, with defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
    pub sort: PostSort,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: PostSort::default(),
        }
    }
}

impl PaginationQuery {
    /// Checks every parameter and resolves defaults for the absent ones.
    pub fn params(&self) -> Result<PageParams, ValidationErrors> {
        self.validate()?;

        let defaults = PageParams::default();
        Ok(PageParams {
            page: self
                .page
                .as_deref()
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.page),
            limit: self
                .limit
                .as_deref()
                .and_then(|l| l.trim().parse().ok())
                .unwrap_or(defaults.limit),
            sort: self
                .sort
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sort),
        })
    }
}

impl RequestRules for PaginationQuery {
    const FIELDS: &'static [&'static str] = &["page", "limit", "sort"];
}
