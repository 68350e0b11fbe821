//! Application error type with HTTP response conversion.
//!
//! Every failure that reaches a handler boundary is an [`AppError`]. The
//! error carries an [`ErrorKind`] used for classification, the HTTP status
//! to answer with, and the underlying cause as an [`anyhow::Error`].
//!
//! Responses always have the same JSON shape:
//!
//! ```json
//! { "error": "not_found", "message": "User 6f1c... not found" }
//! ```
//!
//! Internal errors never put their cause in the body. The cause travels in
//! the response extensions as [`InternalErrorDetail`] so the error handler
//! middleware can log it (and, in development, expose it).

use std::fmt;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Classification of an application failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    Internal,
}

impl ErrorKind {
    /// Default status code for this kind.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classifies a bare status code, used for responses that were produced
    /// outside of [`AppError`] (framework rejections, fallbacks).
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::CONFLICT => ErrorKind::Conflict,
            StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN => ErrorKind::Forbidden,
            s if s.is_client_error() => ErrorKind::Validation,
            _ => ErrorKind::Internal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
    /// Cause of an internal error, only present in development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: kind,
            message: message.into(),
            detail: None,
        }
    }
}

/// Cause of an internal error, attached to the response extensions.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            status: kind.status(),
            error: err.into(),
        }
    }

    /// Overrides the status code while keeping the kind.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(Error::msg(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, Error::msg(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, Error::msg(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, Error::msg(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, Error::msg(message.into()))
    }

    /// Input that parsed but failed validation rules (422).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, Error::msg(message.into()))
    }

    /// Input that could not be parsed at all (400).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::validation(message).with_status(StatusCode::BAD_REQUEST)
    }

    /// Message safe to show to clients.
    pub fn public_message(&self) -> String {
        match self.kind {
            ErrorKind::Internal => INTERNAL_MESSAGE.to_string(),
            _ => self.error.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.error)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.kind, self.public_message());
        let mut response = (self.status, Json(body)).into_response();

        if self.kind == ErrorKind::Internal {
            response
                .extensions_mut()
                .insert(InternalErrorDetail(format!("{:#}", self.error)));
        }

        response
    }
}
