// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod firebase_auth;
pub mod identity;
pub mod tasks;
pub mod users;

pub use firebase_auth::FirebaseTokenVerifier;
pub use identity::{IdentityError, IdentityVerifier};
pub use tasks::TaskService;
pub use users::UserService;
