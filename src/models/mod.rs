// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod identity;
pub mod patch;
pub mod response;
pub mod task;
pub mod user;

pub use identity::{Identity, Role};
pub use patch::Patch;
pub use response::ApiResponse;
pub use task::{
    CreateTaskDto, StatusUpdateDto, Task, TaskFilters, TaskPriority, TaskStatus, UpdateTaskDto,
};
pub use user::{CreateUserDto, UpdateUserDto, User, UserProfile};
