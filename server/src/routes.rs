//! HTTP handlers for `/api/tasks`.
//!
//! Each handler performs a single store call (two for stats) and wraps the
//! outcome in an [`Envelope`].

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::error::ServiceError;
use crate::model::{
    CreateTask, SortOrder, Task, TaskField, TaskFilter, TaskSort, TaskStats, UpdateTask,
};
use crate::store::TaskStore;
use crate::SharedStore;

/// Query string of `GET /api/tasks`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub completed: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            completed: self.completed.as_deref().map(|c| c == "true"),
            category: self
                .category
                .as_deref()
                .filter(|c| !c.is_empty() && *c != "all")
                .map(str::to_string),
        }
    }

    pub fn sort(&self) -> TaskSort {
        TaskSort {
            field: TaskField::from_wire(self.sort_by.as_deref().unwrap_or("createdAt")),
            order: match self.sort_order.as_deref() {
                Some("asc") => SortOrder::Asc,
                _ => SortOrder::Desc,
            },
        }
    }
}

/// Ids that do not parse cannot name a stored task.
fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound)
}

pub async fn list_tasks(
    State(store): State<SharedStore>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Task>>>, ServiceError> {
    let Query(params) = params?;
    let tasks = store.find_many(&params.filter(), params.sort())?;
    tracing::debug!(count = tasks.len(), "listed tasks");
    Ok(Json(Envelope::list(tasks)))
}

pub async fn get_task(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Task>>, ServiceError> {
    let id = parse_id(&id)?;
    let task = store.find_by_id(id)?.ok_or(ServiceError::NotFound)?;
    Ok(Json(Envelope::data(task)))
}

pub async fn create_task(
    State(store): State<SharedStore>,
    input: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Task>>), ServiceError> {
    let Json(input) = input?;
    let task = store.insert_one(input.validate()?)?;
    tracing::info!(task_id = %task.id, category = %task.category, "task created");
    Ok((StatusCode::CREATED, Json(Envelope::data(task))))
}

pub async fn update_task(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    input: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<Json<Envelope<Task>>, ServiceError> {
    let id = parse_id(&id)?;
    let Json(input) = input?;
    let patch = input.into_patch()?;
    let task = store.update_by_id(id, &patch)?.ok_or(ServiceError::NotFound)?;
    tracing::info!(task_id = %task.id, completed = task.completed, "task updated");
    Ok(Json(Envelope::data(task)))
}

pub async fn delete_task(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ServiceError> {
    let id = parse_id(&id)?;
    if !store.delete_by_id(id)? {
        return Err(ServiceError::NotFound);
    }
    tracing::info!(task_id = %id, "task deleted");
    Ok(Json(Envelope::message("Task deleted successfully")))
}

pub async fn task_stats(
    State(store): State<SharedStore>,
) -> Result<Json<Envelope<TaskStats>>, ServiceError> {
    Ok(Json(Envelope::data(summarize(store.as_ref())?)))
}

/// Aggregate counts. The total is derived from the grouped counts so that
/// `sum(byCategory) == total` holds even while other requests write.
pub fn summarize(store: &dyn TaskStore) -> Result<TaskStats, ServiceError> {
    let completed = store.count(&TaskFilter::completed(true))?;
    let by_category = store.group_count_by(TaskField::Category)?;
    Ok(TaskStats::new(completed, by_category))
}
