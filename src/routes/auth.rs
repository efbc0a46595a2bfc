// SPDX-License-Identifier: MIT

//! Authentication routes: token check, current profile, registration.

use super::extract::ApiJson;
use crate::error::Result;
use crate::models::{ApiResponse, CreateUserDto, Identity, UserProfile};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Routes under `/auth`. Authentication is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/verify", post(verify_token))
        .route("/auth/me", get(get_current_user))
        .route("/auth/register", post(register))
}

/// Echo the verified identity and record the login.
async fn verify_token(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<Identity>>> {
    state.user_service.record_login(&identity.uid).await?;

    Ok(Json(
        ApiResponse::data(identity).with_message("Token is valid"),
    ))
}

async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    let profile = state.user_service.get_profile(&identity.uid).await?;
    Ok(Json(ApiResponse::data(profile)))
}

/// Create the caller's profile. Shared with `POST /users`.
pub(super) async fn register(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(dto): ApiJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>)> {
    let profile = state
        .user_service
        .create_profile(dto, &identity.uid, &identity.email)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(profile))))
}
