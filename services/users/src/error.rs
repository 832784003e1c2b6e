//! Error taxonomy for user operations and its HTTP rendering

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use common::error::DatabaseError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::Field;

/// Typed failure of a user operation
///
/// A service call either succeeds or fails with exactly one of these.
#[derive(Error, Debug)]
pub enum UserError {
    /// A mandatory text field is empty or absent
    #[error("{field} is required")]
    RequiredFieldMissing { field: Field },

    /// Text does not have the expected shape
    #[error("Invalid {} format", .field.noun())]
    InvalidFormat { field: Field },

    /// Birth date is today or later
    #[error("Birth date must be in the past")]
    InvalidBirthDate,

    /// Computed age is below the configured minimum
    #[error("User must be at least {minimum} years old.")]
    UnderMinimumAge { minimum: u32 },

    /// Range query with `from` after `to`
    #[error("The 'from' date must be before the 'to' date.")]
    InvalidRangeOrder,

    /// Another user already owns the email
    #[error("User with 'Email: {0}' already exists!")]
    DuplicateEmail(String),

    /// No user with the given id
    #[error("User with `ID: {0}` was not found!")]
    NotFound(i64),

    /// Storage failure or any other condition the domain does not model
    #[error("{0}")]
    Unexpected(String),
}

impl UserError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            UserError::RequiredFieldMissing { .. } => "required_field_missing",
            UserError::InvalidFormat { .. } => "invalid_format",
            UserError::InvalidBirthDate => "invalid_birth_date",
            UserError::UnderMinimumAge { .. } => "under_minimum_age",
            UserError::InvalidRangeOrder => "invalid_range_order",
            UserError::DuplicateEmail(_) => "duplicate_email",
            UserError::NotFound(_) => "not_found",
            UserError::Unexpected(_) => "unexpected",
        }
    }

    /// HTTP status the boundary answers with
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<DatabaseError> for UserError {
    fn from(err: DatabaseError) -> Self {
        UserError::Unexpected(err.to_string())
    }
}

/// Type alias for user operation results
pub type UserResult<T> = Result<T, UserError>;

/// Error body returned to HTTP clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub timestamp: i64,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Custom error type for the HTTP boundary
#[derive(Error, Debug)]
pub enum ApiError {
    /// A single typed failure from the service
    #[error(transparent)]
    User(#[from] UserError),

    /// Every field violation found on one candidate
    #[error("{}", join_messages(.0))]
    Validation(Vec<UserError>),

    /// Request could not be parsed into the expected shape
    #[error("{0}")]
    BadRequest(String),
}

fn join_messages(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::User(err) => (err.status(), err.code()),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };

        // Client-facing messages can carry an email, so only the kind is logged
        // for them. Server errors keep their detail in the log, not the body.
        let message = match &self {
            ApiError::User(UserError::Unexpected(detail)) => {
                error!(kind, status = status.as_u16(), "{}", detail);
                "Internal server error".to_string()
            }
            _ => {
                warn!(kind, status = status.as_u16(), "Request rejected");
                self.to_string()
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
