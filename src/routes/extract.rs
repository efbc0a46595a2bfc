// SPDX-License-Identifier: MIT

//! Request extractors whose rejections use the API error envelope.

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// `Json<T>` that reports malformed bodies as a 400 validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Query<T>` that reports bad query strings as a 400 validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
