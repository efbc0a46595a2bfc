// SPDX-License-Identifier: MIT

//! Bearer token authentication and role checks.
//!
//! [`require_auth`] attaches the verified [`Identity`] as a request
//! extension; handlers read it with `Extension<Identity>`.

use crate::error::AppError;
use crate::models::{Identity, Role};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Roles allowed to list the whole user directory.
pub const DIRECTORY_ROLES: &[Role] = &[Role::Admin, Role::Manager];

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("No authorization header provided".to_string()))?;

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Invalid authorization format. Expected: Bearer <token>".to_string(),
            )
        })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("No token provided".to_string()));
    }

    Ok(token)
}

/// Middleware that requires a valid identity token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;
    let identity = state.verifier.verify(token).await?;

    tracing::debug!(uid = %identity.uid, role = %identity.effective_role(), "Authenticated request");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Identity attached by [`optional_auth`]; `None` for anonymous callers.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

/// Like [`require_auth`], but a missing or bad token just means the request
/// continues anonymously.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match extract_bearer_token(request.headers()) {
        Ok(token) => match state.verifier.verify(token).await {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = ?e, "Ignoring invalid token on optional route");
                None
            }
        },
        Err(_) => None,
    };

    request.extensions_mut().insert(OptionalIdentity(identity));
    next.run(request).await
}

/// Check a caller's role against an allow-list. Returns the effective role.
pub fn authorize_role(identity: Option<&Identity>, allowed: &[Role]) -> Result<Role, AppError> {
    let identity =
        identity.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let current = identity.effective_role();
    if !allowed.contains(&current) {
        return Err(AppError::InsufficientRole {
            required: allowed.to_vec(),
            current,
        });
    }

    Ok(current)
}

/// Middleware restricting a route to the given roles. Must run after
/// [`require_auth`].
pub async fn require_role(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize_role(request.extensions().get::<Identity>(), allowed)?;
    Ok(next.run(request).await)
}
