use std::collections::BTreeMap;
use std::{error::Error, fmt::Display};

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// One of the two external data sources failed; holds the host name.
    Upstream(&'static str),
    /// Request payload failed validation; field name -> message.
    Validation(BTreeMap<String, String>),
    EmptyUpdate,
    NotFound,
    Conflict,
    Db(String),
}

pub type Result<T> = core::result::Result<T, AppError>;

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upstream(source) => write!(f, "could not fetch data from {source}"),
            Self::Validation(details) => write!(f, "validation failed: {details:?}"),
            Self::EmptyUpdate => write!(f, "no update fields provided"),
            Self::NotFound => write!(f, "country not found"),
            Self::Conflict => write!(f, "country name already exists"),
            Self::Db(e) => write!(f, "database error: {e}"),
        }
    }
}
impl Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        let unique = value
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation());
        if unique {
            Self::Conflict
        } else {
            Self::Db(value.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(value: validator::ValidationErrors) -> Self {
        let details = value
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), message)
            })
            .collect();
        Self::Validation(details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Upstream(source) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "External data source unavailable",
                    "details": format!("Could not fetch data from {source}"),
                })),
            )
                .into_response(),
            Self::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Validation failed", "details": details })),
            )
                .into_response(),
            Self::EmptyUpdate => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No update fields provided" })),
            )
                .into_response(),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Country not found" })),
            )
                .into_response(),
            Self::Conflict => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "A country with this name already exists" })),
            )
                .into_response(),
            Self::Db(detail) => {
                tracing::error!("database failure: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(range(min = 1, message = "population must be a positive integer"))]
        population: i64,
    }

    #[test]
    fn validation_errors_flatten_to_field_map() {
        let err = Payload { population: -5 }.validate().unwrap_err();
        let AppError::Validation(details) = AppError::from(err) else {
            panic!("expected validation variant");
        };
        assert_eq!(
            details.get("population").map(String::as_str),
            Some("population must be a positive integer")
        );
    }
}
