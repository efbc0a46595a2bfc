// SPDX-License-Identifier: MIT

//! Task model for storage and API.

use crate::db::Document;
use crate::error::AppError;
use crate::models::patch::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const STATUS_MESSAGE: &str = "Invalid status. Must be: todo, in-progress, or done";
const PRIORITY_MESSAGE: &str = "Invalid priority. Must be: low, medium, or high";

/// Kanban column a task sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/app/models/generated/")
)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(AppError::validation(STATUS_MESSAGE)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/app/models/generated/")
)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(AppError::validation(PRIORITY_MESSAGE)),
        }
    }
}

/// Task stored in the `tasks` collection.
///
/// The document id lives in `id` here but is never written into the stored
/// body; see [`Task::from_document`] and [`Task::to_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/app/models/generated/")
)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_by: String,
    #[serde(serialize_with = "crate::time_utils::serialize_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "crate::time_utils::serialize_millis")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
}

impl Task {
    /// Rebuild a task from a stored document body and its id.
    ///
    /// Required fields must be present; a document missing one is reported
    /// as a database error naming the document.
    pub fn from_document(id: &str, mut doc: Document) -> Result<Self, AppError> {
        doc.insert("id".to_string(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(doc))
            .map_err(|e| AppError::Database(format!("Malformed task document {id}: {e}")))
    }

    /// Stored body for this task (everything but the id).
    pub fn to_document(&self) -> Result<Document, AppError> {
        match serde_json::to_value(self).map_err(|e| AppError::Internal(e.into()))? {
            Value::Object(mut doc) => {
                doc.remove("id");
                Ok(doc)
            }
            _ => Err(AppError::Internal(anyhow::anyhow!(
                "task did not serialize to an object"
            ))),
        }
    }
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    require_text(value, "Title is required")
}

fn validate_description(value: &str) -> Result<(), ValidationError> {
    require_text(value, "Description is required")
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("status").with_message(STATUS_MESSAGE.into()))
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskPriority>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("priority").with_message(PRIORITY_MESSAGE.into()))
}

fn require_text(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(message.into()));
    }
    Ok(())
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub estimated_hours: Option<f64>,
}

impl CreateTaskDto {
    /// Validate and stamp a new task. The id is filled in once the store
    /// has assigned one.
    pub fn into_task(self, created_by: &str, now: DateTime<Utc>) -> Result<Task, AppError> {
        self.validate()?;

        let status = self
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?;
        let priority = self
            .priority
            .as_deref()
            .map(str::parse::<TaskPriority>)
            .transpose()?;

        Ok(Task {
            id: String::new(),
            title: self.title,
            description: self.description,
            status: status.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
            assigned_to: self.assigned_to,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            due_date: self.due_date,
            tags: self.tags.unwrap_or_default(),
            estimated_hours: self.estimated_hours,
            actual_hours: None,
        })
    }
}

/// Body of `PUT /tasks/{id}`. Every field is optional and only keys present
/// in the request are written.
///
/// `id`, `createdBy` and `createdAt` are not accepted; unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskDto {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub status: Patch<String>,
    #[serde(default)]
    pub priority: Patch<String>,
    #[serde(default)]
    pub assigned_to: Patch<String>,
    #[serde(default)]
    pub due_date: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Patch<Vec<String>>,
    #[serde(default)]
    pub estimated_hours: Patch<f64>,
    #[serde(default)]
    pub actual_hours: Patch<f64>,
}

impl UpdateTaskDto {
    /// Status-only patch.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Patch::Value(status.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Validate the patch and turn it into the set of fields to merge.
    ///
    /// All violations are reported together. `updatedAt` is added by the
    /// caller.
    pub fn into_merge_document(self) -> Result<Document, AppError> {
        let mut errors = Vec::new();

        check_required_text(&self.title, "Title", &mut errors);
        check_required_text(&self.description, "Description", &mut errors);

        let status = match &self.status {
            Patch::Absent => Patch::Absent,
            Patch::Null => {
                errors.push("Status cannot be null".to_string());
                Patch::Absent
            }
            Patch::Value(raw) => match raw.parse::<TaskStatus>() {
                Ok(status) => Patch::Value(status),
                Err(_) => {
                    errors.push(STATUS_MESSAGE.to_string());
                    Patch::Absent
                }
            },
        };

        let priority = match &self.priority {
            Patch::Absent => Patch::Absent,
            Patch::Null => {
                errors.push("Priority cannot be null".to_string());
                Patch::Absent
            }
            Patch::Value(raw) => match raw.parse::<TaskPriority>() {
                Ok(priority) => Patch::Value(priority),
                Err(_) => {
                    errors.push(PRIORITY_MESSAGE.to_string());
                    Patch::Absent
                }
            },
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        // A stored `tags: null` would not load back as a list.
        let tags = match self.tags {
            Patch::Null => Patch::Value(Vec::new()),
            other => other,
        };

        let mut doc = Document::new();
        let to_internal = |e: serde_json::Error| AppError::Internal(e.into());
        self.title.write_to(&mut doc, "title").map_err(to_internal)?;
        self.description
            .write_to(&mut doc, "description")
            .map_err(to_internal)?;
        status.write_to(&mut doc, "status").map_err(to_internal)?;
        priority.write_to(&mut doc, "priority").map_err(to_internal)?;
        self.assigned_to
            .write_to(&mut doc, "assignedTo")
            .map_err(to_internal)?;
        self.due_date.write_to(&mut doc, "dueDate").map_err(to_internal)?;
        tags.write_to(&mut doc, "tags").map_err(to_internal)?;
        self.estimated_hours
            .write_to(&mut doc, "estimatedHours")
            .map_err(to_internal)?;
        self.actual_hours
            .write_to(&mut doc, "actualHours")
            .map_err(to_internal)?;

        Ok(doc)
    }
}

fn check_required_text(field: &Patch<String>, label: &str, errors: &mut Vec<String>) {
    match field {
        Patch::Null => errors.push(format!("{label} cannot be null")),
        Patch::Value(v) if v.trim().is_empty() => errors.push(format!("{label} cannot be empty")),
        _ => {}
    }
}

/// Body of `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateDto {
    pub status: Option<String>,
}

/// Equality filters for task listing. Absent filters match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilters {
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub priority: Option<String>,
}

impl TaskFilters {
    pub fn assigned_to(user_id: impl Into<String>) -> Self {
        Self {
            assigned_to: Some(user_id.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(title: &str, description: &str) -> CreateTaskDto {
        CreateTaskDto {
            title: title.to_string(),
            description: description.to_string(),
            ..CreateTaskDto::default()
        }
    }

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            Value::String("in-progress".to_string())
        );
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("doing".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn create_applies_defaults_and_stamps() {
        let now = Utc::now();
        let task = dto("Clean lobby", "Vacuum and dust").into_task("u1", now).unwrap();

        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.created_by, "u1");
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
        assert!(task.tags.is_empty());
        assert!(task.actual_hours.is_none());
    }

    #[test]
    fn create_reports_every_violation() {
        let mut bad = dto("  ", "");
        bad.status = Some("doing".to_string());
        bad.priority = Some("urgent".to_string());

        let err = bad.into_task("u1", Utc::now()).unwrap_err();
        let AppError::Validation(messages) = err else {
            panic!("expected validation error");
        };

        assert_eq!(messages.len(), 4);
        assert!(messages.contains(&"Title is required".to_string()));
        assert!(messages.contains(&"Description is required".to_string()));
        assert!(messages.contains(&STATUS_MESSAGE.to_string()));
        assert!(messages.contains(&PRIORITY_MESSAGE.to_string()));
    }

    #[test]
    fn document_never_contains_id() {
        let mut task = dto("t", "d")
            .into_task("u1", crate::time_utils::now_millis())
            .unwrap();
        task.id = "abc".to_string();

        let doc = task.to_document().unwrap();
        assert!(!doc.contains_key("id"));
        assert_eq!(doc.get("createdBy"), Some(&Value::String("u1".to_string())));

        let back = Task::from_document("abc", doc).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn from_document_requires_core_fields() {
        let mut doc = Document::new();
        doc.insert("title".to_string(), Value::String("t".to_string()));

        let err = Task::from_document("broken", doc).unwrap_err();
        assert!(matches!(err, AppError::Database(msg) if msg.contains("broken")));
    }

    #[test]
    fn empty_patch_writes_nothing() {
        let doc = UpdateTaskDto::default().into_merge_document().unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn patch_keeps_null_for_clearable_fields() {
        let patch: UpdateTaskDto =
            serde_json::from_str(r#"{"assignedTo": null, "tags": null, "actualHours": 3}"#)
                .unwrap();
        let doc = patch.into_merge_document().unwrap();

        assert_eq!(doc.get("assignedTo"), Some(&Value::Null));
        assert_eq!(doc.get("tags"), Some(&Value::Array(vec![])));
        assert_eq!(doc.get("actualHours"), Some(&serde_json::json!(3.0)));
        assert!(!doc.contains_key("title"));
    }

    #[test]
    fn patch_rejects_clearing_required_fields() {
        let patch: UpdateTaskDto =
            serde_json::from_str(r#"{"title": null, "description": " ", "status": "blocked"}"#)
                .unwrap();

        let AppError::Validation(messages) = patch.into_merge_document().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(
            messages,
            vec![
                "Title cannot be null".to_string(),
                "Description cannot be empty".to_string(),
                STATUS_MESSAGE.to_string(),
            ]
        );
    }

    #[test]
    fn patch_ignores_immutable_keys() {
        let patch: UpdateTaskDto = serde_json::from_str(
            r#"{"id": "x", "createdBy": "intruder", "createdAt": "2020-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(patch.into_merge_document().unwrap().is_empty());
    }
}
