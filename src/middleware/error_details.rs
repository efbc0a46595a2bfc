// SPDX-License-Identifier: MIT

//! Development-only middleware that exposes internal error details.
//!
//! Error responses carry an [`ErrorDetails`] extension. When this layer is
//! installed, that text is copied into the JSON body as `stack`.

use crate::error::ErrorDetails;
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

const MAX_ERROR_BODY: usize = 64 * 1024;

pub async fn expose_error_details(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let Some(details) = response.extensions().get::<ErrorDetails>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Could not buffer error body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut fields)) => {
            fields.insert("stack".to_string(), Value::String(details.0));
            match serde_json::to_vec(&fields) {
                Ok(encoded) => {
                    parts.headers.remove(header::CONTENT_LENGTH);
                    Body::from(encoded)
                }
                Err(_) => Body::from(bytes),
            }
        }
        _ => Body::from(bytes),
    };

    Response::from_parts(parts, body)
}
