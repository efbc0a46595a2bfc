// SPDX-License-Identifier: MIT

//! Identity verification contract consumed by the auth middleware.

use crate::error::AppError;
use crate::models::Identity;
use async_trait::async_trait;

/// Why a bearer token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    Expired,
    Revoked,
    /// Bad signature, wrong audience, malformed, disabled account, ...
    Invalid(String),
    /// The verifier could not reach its key set or account lookup.
    Unavailable(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Expired => AppError::TokenExpired,
            IdentityError::Revoked => AppError::TokenRevoked,
            IdentityError::Invalid(reason) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
                AppError::InvalidToken
            }
            IdentityError::Unavailable(reason) => AppError::IdentityService(reason),
        }
    }
}

/// Turns a bearer token into a verified [`Identity`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}
