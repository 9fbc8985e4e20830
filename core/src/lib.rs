//! Client core for the task service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the stateless
//! `TaskClient`, `TaskManager` keeps the task list, view filter and edit
//! buffer that a UI renders from.
//!
//! # Design
//! - `TaskClient` holds only `base_url`; each operation is a `build_*` /
//!   `parse_*` pair.
//! - `TaskManager` is constructed by the host and passed around by
//!   reference; there is no global instance.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod manager;
pub mod types;

pub use client::TaskClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use manager::{
    Action, EditBuffer, Effect, Notification, NotificationKind, Outgoing, Progress, ProgressTier,
    TaskCard, TaskListView, TaskManager, ViewFilter, EXIT_ANIMATION,
};
pub use types::{CreateTask, ListQuery, Task, TaskStats, UpdateTask};
