//! Stateful task-list component driven by the host's event loop.
//!
//! # Design
//! `TaskManager` owns the last-fetched task list, the view filter, the edit
//! buffer and pending notifications. User actions return an [`Outgoing`]
//! request for the host to execute; the host hands the response back to
//! [`TaskManager::complete`], which updates state and returns follow-up
//! [`Effect`]s. Every mutation is followed by a full reload; nothing is
//! patched locally. Actions are not queued, so overlapping reloads are
//! last-write-wins on the rendered list.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::client::TaskClient;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreateTask, ListQuery, Task, UpdateTask};

/// How long a deleted card plays its exit animation before the list reloads.
pub const EXIT_ANIMATION: Duration = Duration::from_millis(300);

/// Client-side view selection over already-fetched tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl ViewFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            ViewFilter::All => true,
            ViewFilter::Completed => task.completed,
            ViewFilter::Pending => !task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewFilter::All => "all",
            ViewFilter::Completed => "completed",
            ViewFilter::Pending => "pending",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter {0:?}, expected all, completed or pending")]
pub struct UnknownFilter(pub String);

impl FromStr for ViewFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ViewFilter::All),
            "completed" => Ok(ViewFilter::Completed),
            "pending" => Ok(ViewFilter::Pending),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an in-flight request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Create,
    Toggle(Uuid),
    SaveEdit(Uuid),
    Delete(Uuid),
}

/// A request the host must execute, tagged with its purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub action: Action,
    pub request: HttpRequest,
}

/// Follow-up work returned by [`TaskManager::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send(Outgoing),
    /// Send once `delay` has elapsed. Used to let the exit animation finish.
    SendAfter(Duration, Outgoing),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient on-screen message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// The fields open in the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub completed: bool,
    pub created_on: NaiveDate,
    /// The card is playing its exit animation.
    pub exiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListView {
    /// Placeholder shown when the filtered view has no tasks.
    Empty,
    Cards(Vec<TaskCard>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTier {
    /// Every task is done.
    Complete,
    /// At least half are done.
    Halfway,
    Started,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
    pub tier: ProgressTier,
}

impl Progress {
    pub fn label(&self) -> String {
        format!("{}% Complete", self.percentage)
    }
}

pub struct TaskManager {
    client: TaskClient,
    tasks: Vec<Task>,
    current_filter: ViewFilter,
    editing: Option<EditBuffer>,
    exiting: HashSet<Uuid>,
    notifications: Vec<Notification>,
}

impl TaskManager {
    pub fn new(client: TaskClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            current_filter: ViewFilter::All,
            editing: None,
            exiting: HashSet::new(),
            notifications: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn current_filter(&self) -> ViewFilter {
        self.current_filter
    }

    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.current_filter = filter;
    }

    pub fn editing(&self) -> Option<&EditBuffer> {
        self.editing.as_ref()
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        self.editing.as_mut()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn is_exiting(&self, id: Uuid) -> bool {
        self.exiting.contains(&id)
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NotificationKind::Success => tracing::debug!(%message, "notification"),
            NotificationKind::Error => tracing::warn!(%message, "notification"),
        }
        self.notifications.push(Notification { kind, message });
    }

    fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Fetch the full, unfiltered list.
    pub fn load(&self) -> Outgoing {
        Outgoing {
            action: Action::Load,
            request: self.client.build_list_tasks(&ListQuery::default()),
        }
    }

    /// Create a task. A blank title is rejected locally and nothing is sent.
    pub fn add(&mut self, title: &str, description: &str, category: &str) -> Option<Outgoing> {
        let title = title.trim();
        if title.is_empty() {
            self.notify(NotificationKind::Error, "Please enter a task title");
            return None;
        }
        let input = CreateTask {
            title: title.to_string(),
            description: Some(description.trim().to_string()),
            category: Some(category.to_string()),
            ..CreateTask::default()
        };
        self.outgoing(Action::Create, self.client.build_create_task(&input))
    }

    /// Flip `completed` relative to the last-fetched value.
    pub fn toggle(&mut self, id: Uuid) -> Option<Outgoing> {
        let completed = self.find(id)?.completed;
        let input = UpdateTask {
            completed: Some(!completed),
            ..UpdateTask::default()
        };
        self.outgoing(Action::Toggle(id), self.client.build_update_task(id, &input))
    }

    /// Open the edit buffer for `id`. Returns `false` when the task is unknown.
    pub fn edit(&mut self, id: Uuid) -> bool {
        let Some(task) = self.find(id) else {
            return false;
        };
        self.editing = Some(EditBuffer {
            id,
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category.clone(),
        });
        true
    }

    /// Send the edit buffer. A blank title is rejected locally.
    pub fn save_edit(&mut self) -> Option<Outgoing> {
        let buffer = self.editing.as_ref()?;
        let title = buffer.title.trim().to_string();
        if title.is_empty() {
            self.notify(NotificationKind::Error, "Task title cannot be empty");
            return None;
        }
        let id = buffer.id;
        let input = UpdateTask {
            title: Some(title),
            description: Some(buffer.description.trim().to_string()),
            category: Some(buffer.category.clone()),
            ..UpdateTask::default()
        };
        self.outgoing(Action::SaveEdit(id), self.client.build_update_task(id, &input))
    }

    /// Delete after `confirm` approves. The card starts its exit animation
    /// while the request is in flight.
    pub fn delete(&mut self, id: Uuid, confirm: impl FnOnce(&Task) -> bool) -> Option<Outgoing> {
        if self.exiting.contains(&id) || !confirm(self.find(id)?) {
            return None;
        }
        self.exiting.insert(id);
        Some(Outgoing {
            action: Action::Delete(id),
            request: self.client.build_delete_task(id),
        })
    }

    fn outgoing(
        &mut self,
        action: Action,
        request: Result<HttpRequest, crate::ApiError>,
    ) -> Option<Outgoing> {
        match request {
            Ok(request) => Some(Outgoing { action, request }),
            Err(e) => {
                self.notify(NotificationKind::Error, e.to_string());
                None
            }
        }
    }

    /// Apply the response to a request previously returned by this manager.
    pub fn complete(&mut self, action: Action, response: HttpResponse) -> Vec<Effect> {
        match action {
            Action::Load => {
                match self.client.parse_list_tasks(response) {
                    Ok(tasks) => {
                        tracing::debug!(count = tasks.len(), "tasks loaded");
                        self.tasks = tasks;
                        let tasks = &self.tasks;
                        self.exiting.retain(|id| tasks.iter().any(|t| t.id == *id));
                    }
                    Err(e) => self.notify(NotificationKind::Error, format!("Failed to load tasks: {e}")),
                }
                Vec::new()
            }
            Action::Create => {
                match self.client.parse_create_task(response) {
                    Ok(_) => self.notify(NotificationKind::Success, "Task added successfully"),
                    Err(e) => self.notify(NotificationKind::Error, format!("Failed to add task: {e}")),
                }
                vec![Effect::Send(self.load())]
            }
            Action::Toggle(_) => match self.client.parse_update_task(response) {
                Ok(_) => vec![Effect::Send(self.load())],
                Err(e) => {
                    self.notify(NotificationKind::Error, format!("Failed to update task: {e}"));
                    Vec::new()
                }
            },
            Action::SaveEdit(id) => match self.client.parse_update_task(response) {
                Ok(_) => {
                    if self.editing.as_ref().is_some_and(|b| b.id == id) {
                        self.editing = None;
                    }
                    self.notify(NotificationKind::Success, "Task updated successfully");
                    vec![Effect::Send(self.load())]
                }
                Err(e) => {
                    self.notify(NotificationKind::Error, format!("Failed to update task: {e}"));
                    Vec::new()
                }
            },
            Action::Delete(id) => match self.client.parse_delete_task(response) {
                Ok(_) => {
                    self.notify(NotificationKind::Success, "Task deleted successfully");
                    vec![Effect::SendAfter(EXIT_ANIMATION, self.load())]
                }
                Err(e) => {
                    self.exiting.remove(&id);
                    self.notify(NotificationKind::Error, format!("Failed to delete task: {e}"));
                    Vec::new()
                }
            },
        }
    }

    /// The list as it should currently be drawn.
    pub fn render(&self) -> TaskListView {
        let cards: Vec<TaskCard> = self
            .tasks
            .iter()
            .filter(|t| self.current_filter.matches(t))
            .map(|t| TaskCard {
                id: t.id,
                title: t.title.clone(),
                description: (!t.description.is_empty()).then(|| t.description.clone()),
                category: t.category.clone(),
                completed: t.completed,
                created_on: t.created_at.date_naive(),
                exiting: self.exiting.contains(&t.id),
            })
            .collect();
        if cards.is_empty() {
            TaskListView::Empty
        } else {
            TaskListView::Cards(cards)
        }
    }

    /// Completion over the full list, ignoring the view filter.
    pub fn progress(&self) -> Progress {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let percentage = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        let tier = match percentage {
            100 => ProgressTier::Complete,
            50.. => ProgressTier::Halfway,
            _ => ProgressTier::Started,
        };
        Progress {
            total,
            completed,
            percentage,
            tier,
        }
    }
}
