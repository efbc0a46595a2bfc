// SPDX-License-Identifier: MIT

//! User directory over the `users` collection, keyed by identity uid.

use crate::db::{collections, Document, DocumentStore};
use crate::error::{AppError, Result};
use crate::models::{CreateUserDto, Identity, UpdateUserDto, User, UserProfile};
use crate::time_utils::{now_millis, now_rfc3339};
use serde_json::Value;
use std::sync::Arc;

/// Service for reading and maintaining user profiles.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The caller's own profile.
    pub async fn get_profile(&self, uid: &str) -> Result<UserProfile> {
        self.find(uid)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }

    /// Create the caller's profile. `fallback_email` is used when the body
    /// has none, normally the token's email.
    pub async fn create_profile(
        &self,
        dto: CreateUserDto,
        actor_uid: &str,
        fallback_email: &str,
    ) -> Result<UserProfile> {
        if self.find(actor_uid).await?.is_some() {
            return Err(AppError::Conflict("User profile already exists".to_string()));
        }

        let user = dto.into_user(actor_uid, fallback_email, now_millis())?;
        self.store
            .set(collections::USERS, actor_uid, user.to_document()?)
            .await?;

        tracing::info!(uid = actor_uid, role = %user.role, "User profile created");
        Ok(user.into())
    }

    /// Update a profile. Callers may edit themselves; admins may edit anyone.
    pub async fn update_profile(
        &self,
        target_uid: &str,
        updates: UpdateUserDto,
        actor: &Identity,
    ) -> Result<UserProfile> {
        if actor.uid != target_uid && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }

        if self.find(target_uid).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let fields = updates.into_merge_document()?;
        if !fields.is_empty() {
            self.store
                .merge(collections::USERS, target_uid, fields)
                .await
                .map_err(|e| match e {
                    AppError::NotFound(_) => AppError::NotFound("User not found".to_string()),
                    other => other,
                })?;
        }

        tracing::info!(uid = target_uid, actor = %actor.uid, "User profile updated");
        self.get_profile_by_id(target_uid).await
    }

    pub async fn list_all_profiles(&self) -> Result<Vec<UserProfile>> {
        self.store
            .list(collections::USERS)
            .await?
            .into_iter()
            .map(|(uid, doc)| User::from_document(&uid, doc).map(UserProfile::from))
            .collect()
    }

    pub async fn get_profile_by_id(&self, id: &str) -> Result<UserProfile> {
        self.find(id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Stamp `lastLogin` if the caller has a profile. Returns whether one
    /// was found.
    pub async fn record_login(&self, uid: &str) -> Result<bool> {
        if self.find(uid).await?.is_none() {
            return Ok(false);
        }

        let mut fields = Document::new();
        fields.insert("lastLogin".to_string(), Value::String(now_rfc3339()));
        self.store.merge(collections::USERS, uid, fields).await?;

        tracing::debug!(uid, "Recorded login");
        Ok(true)
    }

    async fn find(&self, uid: &str) -> Result<Option<User>> {
        self.store
            .get(collections::USERS, uid)
            .await?
            .map(|doc| User::from_document(uid, doc))
            .transpose()
    }
}
