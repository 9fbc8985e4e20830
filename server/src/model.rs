//! Task records, request payloads and the query vocabulary shared by the
//! routes and the store.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

pub const DEFAULT_CATEGORY: &str = "personal";
pub const DEFAULT_PRIORITY: &str = "medium";

/// A stored task as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub completed: bool,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A validated task awaiting insertion. The store assigns `id` and
/// `created_at`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Build a record with every optional field at its default.
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            description: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            due_date: None,
        }
    }
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

impl CreateTask {
    /// Validate the payload and fill in defaults. Empty strings count as
    /// omitted for every optional field.
    pub fn validate(self) -> Result<NewTask, ServiceError> {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(ServiceError::Validation("Task title is required".to_string()));
        }
        let due_date = match self.due_date.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_due_date(raw)?),
        };
        Ok(NewTask {
            title: title.to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            category: non_empty_or(self.category, DEFAULT_CATEGORY),
            priority: non_empty_or(self.priority, DEFAULT_PRIORITY),
            due_date,
        })
    }
}

/// Body of `PUT /api/tasks/{id}`. Only the fields present in the JSON are
/// applied; `dueDate: null` clears the due date. `null` for any other field
/// is rejected, since none of them can be cleared.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "not_null")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "not_null")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "not_null")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "not_null")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "not_null")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
}

/// A present field must carry a value; only absence maps to `None`.
fn not_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<T>::deserialize(deserializer)? {
        Some(value) => Ok(Some(value)),
        None => Err(serde::de::Error::custom("null is not a valid value")),
    }
}

/// Distinguishes `"field": null` (`Some(None)`) from a missing field (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateTask {
    /// Convert into a patch. The title is trimmed but deliberately not
    /// checked for emptiness here; only creation requires it.
    pub fn into_patch(self) -> Result<TaskPatch, ServiceError> {
        let due_date = match self.due_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) if raw.is_empty() => Some(None),
            Some(Some(raw)) => Some(Some(parse_due_date(&raw)?)),
        };
        Ok(TaskPatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
            category: self.category,
            completed: self.completed,
            priority: self.priority,
            due_date,
        })
    }
}

/// A partial update applied in place by the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            task.category.clone_from(category);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = &self.priority {
            task.priority.clone_from(priority);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ServiceError::Validation(format!("invalid dueDate: {raw:?}")))
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// Task fields addressable by sorting and grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Category,
    Completed,
    Priority,
    DueDate,
    CreatedAt,
}

impl TaskField {
    /// Map a wire (camelCase) field name.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "category" => Some(Self::Category),
            "completed" => Some(Self::Completed),
            "priority" => Some(Self::Priority),
            "dueDate" => Some(Self::DueDate),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    /// The grouping key of `task` under this field.
    pub fn key(self, task: &Task) -> String {
        match self {
            Self::Title => task.title.clone(),
            Self::Description => task.description.clone(),
            Self::Category => task.category.clone(),
            Self::Completed => task.completed.to_string(),
            Self::Priority => task.priority.clone(),
            Self::DueDate => task
                .due_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "null".to_string()),
            Self::CreatedAt => task.created_at.to_rfc3339(),
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Title => a.title.cmp(&b.title),
            Self::Description => a.description.cmp(&b.description),
            Self::Category => a.category.cmp(&b.category),
            Self::Completed => a.completed.cmp(&b.completed),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::DueDate => a.due_date.cmp(&b.due_date),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

/// Server-side query restriction. `None` leaves a field unrestricted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub category: Option<String>,
}

impl TaskFilter {
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            category: None,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.completed.is_none_or(|c| task.completed == c)
            && self.category.as_deref().is_none_or(|c| task.category == c)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Ordering for `find_many`. A `field` of `None` keeps natural order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskSort {
    pub field: Option<TaskField>,
    pub order: SortOrder,
}

impl Default for TaskSort {
    fn default() -> Self {
        Self {
            field: Some(TaskField::CreatedAt),
            order: SortOrder::Desc,
        }
    }
}

impl TaskSort {
    /// Compare two tasks. Natural order (creation time, then id) breaks ties
    /// and is unaffected by `order`.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let primary = match self.field {
            Some(field) => match self.order {
                SortOrder::Asc => field.compare(a, b),
                SortOrder::Desc => field.compare(b, a),
            },
            None => Ordering::Equal,
        };
        primary.then_with(|| natural_order(a, b))
    }
}

fn natural_order(a: &Task, b: &Task) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Aggregate counts returned by `GET /api/tasks/stats/summary`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub percentage: u32,
    pub by_category: std::collections::BTreeMap<String, u64>,
}

impl TaskStats {
    /// `total` is the sum of `by_category`, so both come from one snapshot.
    /// `completed` may come from a separate read and is capped at that total.
    pub fn new(completed: u64, by_category: std::collections::BTreeMap<String, u64>) -> Self {
        let total: u64 = by_category.values().sum();
        let completed = completed.min(total);
        Self {
            total,
            completed,
            pending: total - completed,
            percentage: percentage(completed, total),
            by_category,
        }
    }
}

/// `round(100 * part / whole)`, or 0 for an empty whole.
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
