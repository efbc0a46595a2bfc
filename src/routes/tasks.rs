// SPDX-License-Identifier: MIT

//! Task board routes.

use super::extract::{ApiJson, ApiQuery};
use crate::error::Result;
use crate::models::{
    ApiResponse, CreateTaskDto, Identity, StatusUpdateDto, Task, TaskFilters, UpdateTaskDto,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Routes under `/tasks`. Authentication is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/user/{user_id}", get(list_user_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/status", patch(update_task_status))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    ApiQuery(filters): ApiQuery<TaskFilters>,
) -> Result<Json<ApiResponse<Vec<Task>>>> {
    let tasks = state.task_service.list_tasks(&filters).await?;
    Ok(Json(ApiResponse::data(tasks)))
}

async fn list_user_tasks(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Task>>>> {
    let tasks = state.task_service.list_tasks_by_assignee(&user_id).await?;
    Ok(Json(ApiResponse::data(tasks)))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = state.task_service.get_task(&id).await?;
    Ok(Json(ApiResponse::data(task)))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(dto): ApiJson<CreateTaskDto>,
) -> Result<(StatusCode, Json<ApiResponse<Task>>)> {
    let task = state.task_service.create_task(dto, &identity.uid).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(task))))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(updates): ApiJson<UpdateTaskDto>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = state.task_service.update_task(&id, updates).await?;
    Ok(Json(ApiResponse::data(task)))
}

async fn update_task_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusUpdateDto>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = state
        .task_service
        .update_task_status(&id, body.status.as_deref())
        .await?;
    Ok(Json(ApiResponse::data(task)))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.task_service.delete_task(&id).await?;
    tracing::info!(task_id = %id, uid = %identity.uid, "Task deleted by request");
    Ok(Json(ApiResponse::message("Task deleted successfully")))
}
