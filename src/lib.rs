// SPDX-License-Identifier: MIT

//! Housekeeping API: task board and user directory backend.
//!
//! Callers authenticate with Firebase ID tokens; tasks and profiles live in
//! Firestore (or an in-memory store for local runs and tests).

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{IdentityVerifier, TaskService, UserService};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub task_service: TaskService,
    pub user_service: UserService,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services to one store and one identity verifier.
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            config,
            verifier,
            task_service: TaskService::new(store.clone()),
            user_service: UserService::new(store),
            started_at: Instant::now(),
        }
    }
}
