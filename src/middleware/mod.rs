// SPDX-License-Identifier: MIT

//! Middleware modules (authentication, security, etc.).

pub mod auth;
pub mod error_details;
pub mod security;

pub use auth::{optional_auth, require_auth, require_role};
