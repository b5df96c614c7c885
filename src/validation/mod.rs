//! Request validation pipeline
//!
//! Every incoming body, query string and path id passes through a set of
//! field rules before it reaches a handler. Request types declare their
//! rules with `#[derive(Validate)]`; the built-in `length`, `email` and
//! `required` validators cover most fields and the functions here fill in
//! the rest. Rules are evaluated exhaustively: all violations for all
//! fields are collected and returned together in a single 400 response.
//!
//! - this module: custom rules and the conversion to [`FieldViolation`]s
//! - [`requests`]: normalization and per-field rules tied to one request type
//! - [`extract`]: axum extractors that run the rules

pub mod extract;
pub mod requests;

use crate::types::FieldViolation;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use url::{Host, Url};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub use extract::{ValidId, ValidatedJson, ValidatedQuery};
pub use requests::{
    validate_limit, validate_page, validate_password_present, validate_post_image,
    validate_profile_image, validate_sort,
};

lazy_static! {
    // Display names: letters and spaces only
    static ref NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z\s]+$")
        .expect("NAME_REGEX should be a valid regex pattern");
}

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// A request type with a fixed rule set.
///
/// `FIELDS` lists the wire names in declaration order and fixes the order
/// in which violations are reported.
pub trait RequestRules: Validate {
    const FIELDS: &'static [&'static str];

    /// Normalizes input before the rules run (trimming, lowercasing).
    fn sanitize(&mut self) {}
}

/// Builds a rule failure carrying the rejected value.
pub fn violation<T: Serialize + ?Sized>(
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
    value: &T,
) -> ValidationError {
    let mut err = ValidationError::new(code).with_message(message.into());
    err.add_param(Cow::Borrowed("value"), &value);
    err
}

/// Accepts http, https and ftp URLs whose host has a top-level domain or is
/// an IP address. A missing scheme is read as `http://`.
pub fn is_valid_url(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }

    let candidate = if value.contains("://") {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("http://{}", value))
    };

    let url = match Url::parse(&candidate) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if !URL_SCHEMES.contains(&url.scheme()) {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => match domain.rsplit_once('.') {
            Some((name, tld)) => {
                !name.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
            }
            None => false,
        },
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

/// URL rule for optional image fields: an empty value passes.
pub fn check_url(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() || is_valid_url(value) {
        return Ok(());
    }
    Err(violation("url", message, value))
}

pub fn validate_name_pattern(value: &str) -> Result<(), ValidationError> {
    if !NAME_REGEX.is_match(value) {
        return Err(violation(
            "pattern",
            "Full name can only contain letters and spaces",
            value,
        ));
    }
    Ok(())
}

/// Requires at least one lowercase letter, one uppercase letter and one digit.
pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    let has_lowercase = value.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());

    if !(has_lowercase && has_uppercase && has_digit) {
        return Err(violation(
            "password_strength",
            "Password must contain at least one lowercase letter, one uppercase letter, and one number",
            value,
        ));
    }
    Ok(())
}

/// Parses a decimal integer within `min..=max`.
pub fn check_int_range(
    raw: &str,
    min: u32,
    max: u32,
    message: &'static str,
) -> Result<u32, ValidationError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(violation("range", message, raw)),
    }
}

pub fn check_one_of(
    raw: &str,
    allowed: &[&str],
    message: &'static str,
) -> Result<(), ValidationError> {
    if !allowed.contains(&raw) {
        return Err(violation("one_of", message, raw));
    }
    Ok(())
}

/// Resource ids are UUIDs in their hyphenated text form.
pub fn check_id(raw: &str) -> Result<(), ValidationError> {
    match Uuid::try_parse(raw) {
        Ok(id) if id.hyphenated().to_string() == raw.to_ascii_lowercase() => Ok(()),
        _ => Err(violation("id", "Invalid id format", raw)),
    }
}

/// Maps a struct field name (`full_name`) to its wire name (`fullName`).
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Flattens rule failures into the response shape, ordered by `fields`.
pub fn into_violations(errors: ValidationErrors, fields: &[&str]) -> Vec<FieldViolation> {
    let mut grouped: Vec<(usize, FieldViolation)> = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        let field = wire_name(&field);
        let rank = fields
            .iter()
            .position(|f| *f == field)
            .unwrap_or(fields.len());

        for err in field_errors.iter() {
            grouped.push((
                rank,
                FieldViolation {
                    field: field.clone(),
                    message: err
                        .message
                        .as_ref()
                        .map_or("Invalid value".to_string(), |m| m.to_string()),
                    value: err
                        .params
                        .get("value")
                        .cloned()
                        .unwrap_or(serde_json::Value::Null),
                },
            ));
        }
    }

    // stable: keeps rule order within a field
    grouped.sort_by_key(|(rank, _)| *rank);
    grouped.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com/a.png"));
        assert!(is_valid_url("example.com/a.png"));
        assert!(is_valid_url("ftp://files.example.org"));
        assert!(is_valid_url("http://127.0.0.1:8080/x"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("http://localhost/x"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_url_rule_skips_empty() {
        assert!(check_url("", "bad").is_ok());
        assert!(check_url("https://example.com/a.png", "bad").is_ok());

        let err = check_url("nope", "bad").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("bad"));
        assert_eq!(err.params["value"], serde_json::json!("nope"));
    }

    #[test]
    fn test_name_pattern() {
        assert!(validate_name_pattern("Jane Doe").is_ok());
        assert!(validate_name_pattern("Jane 2").is_err());
        assert!(validate_name_pattern("Jane_Doe").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("Abcdef1").is_ok());
        assert!(validate_password_strength("abcdef1").is_err());
        assert!(validate_password_strength("ABCDEF1").is_err());
        assert!(validate_password_strength("Abcdefg").is_err());
    }

    #[test]
    fn test_int_range() {
        assert_eq!(check_int_range("5", 1, 10, "range").ok(), Some(5));
        assert!(check_int_range("0", 1, 10, "range").is_err());
        assert!(check_int_range("11", 1, 10, "range").is_err());
        assert!(check_int_range("-1", 1, 10, "range").is_err());
        assert!(check_int_range("two", 1, 10, "range").is_err());
    }

    #[test]
    fn test_id_format() {
        assert!(check_id("6f1c2f0e-9a53-4a4e-8a39-3a5e2b1f0c11").is_ok());
        assert!(check_id("not-an-id").is_err());
        assert!(check_id("507f1f77bcf86cd799439011").is_err());
    }

    #[test]
    fn test_violation_carries_value_and_message() {
        let mut errors = ValidationErrors::new();
        errors.add("limit", violation("range", "Limit must be between 1 and 100", "101"));

        let violations = into_violations(errors, &["page", "limit"]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "limit");
        assert_eq!(violations[0].message, "Limit must be between 1 and 100");
        assert_eq!(violations[0].value, serde_json::json!("101"));
    }

    #[test]
    fn test_violations_follow_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add("sort", violation("one_of", "Invalid sort field", "x"));
        errors.add("page", violation("range", "bad page", "0"));

        let fields: Vec<String> = into_violations(errors, &["page", "limit", "sort"])
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["page", "sort"]);
    }

    #[test]
    fn test_violations_use_wire_names() {
        let mut errors = ValidationErrors::new();
        errors.add("full_name", violation("length", "too short", "J"));
        errors.add("email", violation("email", "bad email", "x"));

        let fields: Vec<String> = into_violations(errors, &["fullName", "email"])
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["fullName", "email"]);
        assert_eq!(wire_name("image_url"), "imageUrl");
        assert_eq!(wire_name("bio"), "bio");
    }
}
