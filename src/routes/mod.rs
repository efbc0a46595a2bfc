// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod auth;
pub mod extract;
pub mod tasks;
pub mod users;

use crate::middleware::auth::{optional_auth, require_auth, OptionalIdentity};
use crate::middleware::error_details::expose_error_details;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::{middleware, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/app/models/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// Seconds since the process started serving
    pub uptime: f64,
    pub environment: String,
    pub build_id: String,
}

/// Health check response
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.as_str().to_string(),
        build_id,
    })
}

#[derive(Serialize)]
struct Endpoints {
    health: &'static str,
    api: String,
    tasks: String,
    users: String,
    auth: String,
}

#[derive(Serialize)]
struct IndexResponse {
    message: &'static str,
    version: &'static str,
    authenticated: bool,
    endpoints: Endpoints,
}

/// Service index. Reports whether the caller sent a valid token.
async fn index(
    State(state): State<Arc<AppState>>,
    Extension(OptionalIdentity(identity)): Extension<OptionalIdentity>,
) -> Json<IndexResponse> {
    let prefix = &state.config.api_prefix;
    Json(IndexResponse {
        message: "Housekeeping SaaS API",
        version: env!("CARGO_PKG_VERSION"),
        authenticated: identity.is_some(),
        endpoints: Endpoints {
            health: "/health",
            api: if prefix.is_empty() { "/".to_string() } else { prefix.clone() },
            tasks: format!("{prefix}/tasks"),
            users: format!("{prefix}/users"),
            auth: format!("{prefix}/auth"),
        },
    })
}

#[derive(Serialize)]
struct NotFoundResponse {
    success: bool,
    error: &'static str,
    message: String,
    timestamp: String,
}

async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            success: false,
            error: "Not Found",
            message: format!("Route {method} {} not found", uri.path()),
            timestamp: now_rfc3339(),
        }),
    )
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed = state.config.cors_origin.clone();
    let allow_localhost = state.config.is_development();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == allowed
                    || (allow_localhost
                        && (origin_str.starts_with("http://localhost")
                            || origin_str.starts_with("http://127.0.0.1")))
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Every API route needs a token; unmatched paths still fall through to 404
    let api_routes = Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(tasks::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route(
            "/",
            get(index).route_layer(middleware::from_fn_with_state(
                state.clone(),
                optional_auth,
            )),
        );

    let prefix = state.config.api_prefix.as_str();
    let router = if prefix.is_empty() {
        public_routes.merge(api_routes)
    } else {
        public_routes.nest(prefix, api_routes)
    };

    let mut router = router
        .fallback(not_found)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ));

    if state.config.is_development() {
        router = router.layer(middleware::from_fn(expose_error_details));
    }

    router
        .layer(cors_layer(&state))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
