// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use crate::models::Role;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed credentials.
    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    /// Authenticated, but not allowed to touch this resource.
    #[error("{0}")]
    Forbidden(String),

    #[error("Insufficient permissions")]
    InsufficientRole { required: Vec<Role>, current: Role },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Identity service error: {0}")]
    IdentityService(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Single-message validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_)
            | AppError::InvalidToken
            | AppError::TokenExpired
            | AppError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::IdentityService(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code for the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InvalidToken => "invalid_token",
            AppError::TokenExpired => "token_expired",
            AppError::TokenRevoked => "token_revoked",
            AppError::Forbidden(_) | AppError::InsufficientRole { .. } => "forbidden",
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database_error",
            AppError::IdentityService(_) => "identity_service_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// Full internal description of the error that produced a response.
///
/// Attached to every error response as an extension; only the development
/// middleware in [`crate::middleware::error_details`] puts it on the wire.
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub String);

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<Role>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, code = self.code(), "Request failed");
        } else {
            tracing::warn!(error = %self, code = self.code(), "Request rejected");
        }

        let message = if status.is_server_error() {
            "Something went wrong".to_string()
        } else {
            self.to_string()
        };

        let mut body = ErrorResponse {
            success: false,
            error: self.code(),
            message,
            errors: None,
            required: None,
            current: None,
        };

        match &self {
            AppError::Validation(errors) => body.errors = Some(errors.clone()),
            AppError::InsufficientRole { required, current } => {
                body.required = Some(required.clone());
                body.current = Some(*current);
            }
            _ => {}
        }

        let mut response = (status, Json(body)).into_response();
        response
            .extensions_mut()
            .insert(ErrorDetails(format!("{self:?}")));
        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
            })
            .collect();

        AppError::Validation(messages)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
