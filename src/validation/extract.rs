//! Extractors that run the validation pipeline before a handler sees input.

use super::{check_id, into_violations, RequestRules};
use crate::types::{AppError, FieldViolation};
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body that has been sanitized and has passed its rule set.
///
/// Malformed JSON is rejected with 400 before any rule runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + RequestRules,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

        value.sanitize();
        value
            .validate()
            .map_err(|errors| AppError::Validation(into_violations(errors, T::FIELDS)))?;

        Ok(ValidatedJson(value))
    }
}

/// Query string that has passed its rule set.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + RequestRules,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(mut value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

        value.sanitize();
        value
            .validate()
            .map_err(|errors| AppError::Validation(into_violations(errors, T::FIELDS)))?;

        Ok(ValidatedQuery(value))
    }
}

/// The `{id}` path segment, checked to be a well-formed resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidId(pub String);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

        check_id(&id).map_err(|_| {
            AppError::Validation(vec![FieldViolation {
                field: "id".to_string(),
                message: "Invalid id format".to_string(),
                value: serde_json::Value::String(id.clone()),
            }])
        })?;

        Ok(ValidId(id))
    }
}
