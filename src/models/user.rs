//! User profile model for storage and API.

use crate::db::Document;
use crate::error::AppError;
use crate::models::identity::Role;
use crate::models::patch::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const ROLE_MESSAGE: &str = "Invalid role. Must be: admin, manager, or staff";

/// User profile stored in the `users` collection, keyed by uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity-provider subject id (also the document id, not stored in the body)
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Display only; authorization uses the token role
    #[serde(default)]
    pub role: Role,
    #[serde(serialize_with = "crate::time_utils::serialize_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::time_utils::serialize_millis_opt"
    )]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn from_document(uid: &str, mut doc: Document) -> Result<Self, AppError> {
        doc.insert("uid".to_string(), Value::String(uid.to_string()));
        serde_json::from_value(Value::Object(doc))
            .map_err(|e| AppError::Database(format!("Malformed user document {uid}: {e}")))
    }

    pub fn to_document(&self) -> Result<Document, AppError> {
        match serde_json::to_value(self).map_err(|e| AppError::Internal(e.into()))? {
            Value::Object(mut doc) => {
                doc.remove("uid");
                Ok(doc)
            }
            _ => Err(AppError::Internal(anyhow::anyhow!(
                "user did not serialize to an object"
            ))),
        }
    }
}

/// Public projection of a user returned by every read endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/app/models/generated/")
)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            role: user.role,
        }
    }
}

fn validate_display_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("required").with_message("Display name is required".into())
        );
    }
    Ok(())
}

fn validate_role(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Role>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("role").with_message(ROLE_MESSAGE.into()))
}

/// Body of `POST /auth/register` and `POST /users`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    /// Falls back to the token's email when omitted.
    pub email: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_display_name"))]
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

impl CreateUserDto {
    pub fn into_user(
        self,
        uid: &str,
        fallback_email: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AppError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => match AppError::from(e) {
                AppError::Validation(messages) => messages,
                other => return Err(other),
            },
        };

        let email = self
            .email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| fallback_email.to_string());
        if email.trim().is_empty() {
            errors.push("Email is required".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let role = self
            .role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()
            .map_err(AppError::validation)?
            .unwrap_or_default();

        Ok(User {
            uid: uid.to_string(),
            email,
            display_name: self.display_name,
            photo_url: self.photo_url,
            role,
            created_at: now,
            last_login: None,
        })
    }
}

/// Body of `PUT /users/{id}`. Only these three fields may change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[serde(default)]
    pub display_name: Patch<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Patch<String>,
    #[serde(default)]
    pub role: Patch<String>,
}

impl UpdateUserDto {
    pub fn into_merge_document(self) -> Result<Document, AppError> {
        let mut errors = Vec::new();

        match &self.display_name {
            Patch::Null => errors.push("Display name cannot be null".to_string()),
            Patch::Value(v) if v.trim().is_empty() => {
                errors.push("Display name cannot be empty".to_string())
            }
            _ => {}
        }

        let role = match &self.role {
            Patch::Absent => Patch::Absent,
            Patch::Null => {
                errors.push("Role cannot be null".to_string());
                Patch::Absent
            }
            Patch::Value(raw) => match raw.parse::<Role>() {
                Ok(role) => Patch::Value(role),
                Err(_) => {
                    errors.push(ROLE_MESSAGE.to_string());
                    Patch::Absent
                }
            },
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let mut doc = Document::new();
        let to_internal = |e: serde_json::Error| AppError::Internal(e.into());
        self.display_name
            .write_to(&mut doc, "displayName")
            .map_err(to_internal)?;
        self.photo_url
            .write_to(&mut doc, "photoURL")
            .map_err(to_internal)?;
        role.write_to(&mut doc, "role").map_err(to_internal)?;
        Ok(doc)
    }
}
