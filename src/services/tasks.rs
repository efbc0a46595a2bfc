// SPDX-License-Identifier: MIT

//! Task board operations over the `tasks` collection.

use crate::db::{collections, Document, DocumentStore, FieldFilter};
use crate::error::{AppError, Result};
use crate::models::{
    CreateTaskDto, Task, TaskFilters, TaskPriority, TaskStatus, UpdateTaskDto,
};
use crate::time_utils::{now_millis, now_rfc3339};
use serde_json::Value;
use std::sync::Arc;

const TASK_NOT_FOUND: &str = "Task not found";

/// Service for creating, querying and updating tasks.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn DocumentStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All tasks matching every supplied filter.
    pub async fn list_tasks(&self, filters: &TaskFilters) -> Result<Vec<Task>> {
        let filters = field_filters(filters)?;

        let docs = self.store.query(collections::TASKS, &filters).await?;
        let tasks = docs
            .into_iter()
            .map(|(id, doc)| Task::from_document(&id, doc))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = tasks.len(), filters = filters.len(), "Listed tasks");
        Ok(tasks)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task> {
        self.store
            .get(collections::TASKS, id)
            .await?
            .map(|doc| Task::from_document(id, doc))
            .transpose()?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.to_string()))
    }

    pub async fn create_task(&self, dto: CreateTaskDto, actor_uid: &str) -> Result<Task> {
        let mut task = dto.into_task(actor_uid, now_millis())?;

        task.id = self
            .store
            .insert(collections::TASKS, task.to_document()?)
            .await?;

        tracing::info!(task_id = %task.id, created_by = actor_uid, "Task created");
        Ok(task)
    }

    /// Merge the supplied fields, stamp `updatedAt`, and return the stored
    /// result.
    pub async fn update_task(&self, id: &str, patch: UpdateTaskDto) -> Result<Task> {
        self.ensure_exists(id).await?;

        let mut fields = patch.into_merge_document()?;
        stamp_updated_at(&mut fields);

        self.store
            .merge(collections::TASKS, id, fields)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(TASK_NOT_FOUND.to_string()),
                other => other,
            })?;
        tracing::info!(task_id = id, "Task updated");

        self.get_task(id).await
    }

    pub async fn update_task_status(&self, id: &str, status: Option<&str>) -> Result<Task> {
        let status = status
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("Status is required"))?
            .parse::<TaskStatus>()?;

        self.update_task(id, UpdateTaskDto::status(status)).await
    }

    /// Delete a task. Any authenticated caller may delete any task.
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.ensure_exists(id).await?;
        self.store.delete(collections::TASKS, id).await?;

        tracing::info!(task_id = id, "Task deleted");
        Ok(())
    }

    pub async fn list_tasks_by_assignee(&self, user_id: &str) -> Result<Vec<Task>> {
        self.list_tasks(&TaskFilters::assigned_to(user_id)).await
    }

    async fn ensure_exists(&self, id: &str) -> Result<()> {
        match self.store.get(collections::TASKS, id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(TASK_NOT_FOUND.to_string())),
        }
    }
}

/// Translate listing filters into store predicates, rejecting unknown enum
/// values. Blank parameters are ignored.
fn field_filters(filters: &TaskFilters) -> Result<Vec<FieldFilter>> {
    let mut out = Vec::new();

    if let Some(status) = supplied(&filters.status) {
        out.push(FieldFilter::eq("status", status.parse::<TaskStatus>()?.as_str()));
    }
    if let Some(assigned_to) = supplied(&filters.assigned_to) {
        out.push(FieldFilter::eq("assignedTo", assigned_to));
    }
    if let Some(priority) = supplied(&filters.priority) {
        out.push(FieldFilter::eq(
            "priority",
            priority.parse::<TaskPriority>()?.as_str(),
        ));
    }

    Ok(out)
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn stamp_updated_at(fields: &mut Document) {
    fields.insert("updatedAt".to_string(), Value::String(now_rfc3339()));
}
