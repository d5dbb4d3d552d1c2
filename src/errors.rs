//! # Error Handling for CRUD APIs
//!
//! Every service and controller operation returns [`ApiError`]. It has three
//! shapes:
//!
//! - [`HttpServiceError`]: a rejection that already knows its HTTP status, a
//!   user-facing message and an optional set of itemized errors.
//! - [`EntityNotFoundError`]: the requested identifier does not exist. 404 by
//!   default, overridable per deployment.
//! - `Database`: an opaque persistence failure. The details are logged with
//!   `tracing` and never sent to the client.
//!
//! All of them render the same JSON body:
//!
//! ```json
//! {"status": 404, "message": "todos with id '7' not found", "errors": []}
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crudstarter::{ApiError, HttpServiceError};
//!
//! fn check_stock(requested: u32, available: u32) -> Result<(), ApiError> {
//!     if requested > available {
//!         return Err(HttpServiceError::conflict("Not enough stock").into());
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::ValidationErrors;

/// A failure carrying an HTTP status code, a message and itemized errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServiceError {
    status: StatusCode,
    message: String,
    errors: BTreeSet<String>,
}

impl HttpServiceError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: BTreeSet::new(),
        }
    }

    /// Attach itemized errors, e.g. one entry per failed field.
    #[must_use]
    pub fn with_errors<I, E>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn errors(&self) -> &BTreeSet<String> {
        &self.errors
    }

    fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status.as_u16(),
            message: self.message.clone(),
            errors: self.errors.iter().cloned().collect(),
        }
    }
}

impl fmt::Display for HttpServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}

impl std::error::Error for HttpServiceError {}

/// The requested record does not exist.
///
/// Kept apart from a generic 404 so callers can match on it, while still
/// carrying a status that may be overridden (some deployments hide missing
/// records behind 403).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNotFoundError(HttpServiceError);

impl EntityNotFoundError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(HttpServiceError::new(StatusCode::NOT_FOUND, message))
    }

    /// `"{resource} with id '{id}' not found"`
    pub fn for_id(resource: &str, id: impl fmt::Display) -> Self {
        Self::new(format!("{resource} with id '{id}' not found"))
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.0.status = status;
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.0.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.0.message
    }
}

impl fmt::Display for EntityNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for EntityNotFoundError {}

impl From<EntityNotFoundError> for HttpServiceError {
    fn from(err: EntityNotFoundError) -> Self {
        err.0
    }
}

/// Error returned by every CRUD operation.
#[derive(Debug)]
pub enum ApiError {
    /// Rejection with a known status (validation, conflict, custom domain errors)
    Service(HttpServiceError),

    /// Requested identifier is absent
    NotFound(EntityNotFoundError),

    /// 500 Internal Server Error - persistence failure (details logged, not exposed)
    Database(DbErr),
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(err) => err.status(),
            Self::NotFound(err) => err.status(),
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    fn user_message(&self) -> String {
        match self {
            Self::Service(err) => err.message().to_string(),
            Self::NotFound(err) => err.message().to_string(),
            Self::Database(_) => "A database error occurred".to_string(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database(internal) => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Service(err) => err.body(),
            Self::NotFound(err) => err.0.body(),
            Self::Database(_) => ErrorBody {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                message: self.user_message(),
                errors: Vec::new(),
            },
        }
    }
}

/// JSON body written for every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub errors: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::NotFound(err) => Some(err),
            Self::Database(err) => Some(err),
        }
    }
}

impl From<HttpServiceError> for ApiError {
    fn from(err: HttpServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<EntityNotFoundError> for ApiError {
    fn from(err: EntityNotFoundError) -> Self {
        Self::NotFound(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Service(
            HttpServiceError::unprocessable("Validation failed")
                .with_errors(errors.errors().iter().map(ToString::to_string)),
        )
    }
}

/// `RecordNotFound` becomes 404, unique-constraint violations become 409,
/// everything else is an opaque 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            return Self::NotFound(EntityNotFoundError::new(msg.clone()));
        }
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return Self::Service(HttpServiceError::conflict("Duplicate record"));
        }
        Self::Database(err)
    }
}
