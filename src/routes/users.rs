// SPDX-License-Identifier: MIT

//! User directory routes.

use super::extract::ApiJson;
use crate::error::Result;
use crate::middleware::auth::{require_role, DIRECTORY_ROLES};
use crate::models::{ApiResponse, Identity, UpdateUserDto, UserProfile};
use crate::AppState;
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

/// Routes under `/users`. Authentication is applied in routes/mod.rs; only
/// the listing is role-restricted.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .route_layer(middleware::from_fn_with_state(DIRECTORY_ROLES, require_role))
                .post(super::auth::register),
        )
        .route("/users/{id}", get(get_user).put(update_user))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>> {
    let profiles = state.user_service.list_all_profiles().await?;
    Ok(Json(ApiResponse::data(profiles)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    let profile = state.user_service.get_profile_by_id(&id).await?;
    Ok(Json(ApiResponse::data(profile)))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(updates): ApiJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    let profile = state
        .user_service
        .update_profile(&id, updates, &identity)
        .await?;
    Ok(Json(ApiResponse::data(profile)))
}
