//! The document-store seam.
//!
//! Routes talk to storage only through [`TaskStore`]. [`MemoryStore`] is the
//! implementation the binary ships with; a persistent engine plugs in by
//! implementing the same trait.

use std::{
    collections::{BTreeMap, HashMap},
    sync::RwLock,
};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{NewTask, Task, TaskField, TaskFilter, TaskPatch, TaskSort};

/// An opaque store failure. The message is passed through to clients as-is.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

pub trait TaskStore: Send + Sync {
    /// Insert a record, assigning its id and creation time.
    fn insert_one(&self, task: NewTask) -> Result<Task, StoreError>;

    fn find_many(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<Task>, StoreError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Apply `patch` in place. Returns `None` when `id` is absent.
    fn update_by_id(&self, id: Uuid, patch: &TaskPatch) -> Result<Option<Task>, StoreError>;

    /// Returns `false` when `id` is absent.
    fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;

    fn count(&self, filter: &TaskFilter) -> Result<u64, StoreError>;

    /// Count records per distinct value of `field`.
    fn group_count_by(&self, field: TaskField) -> Result<BTreeMap<String, u64>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError("task store lock poisoned".to_string())
}

impl TaskStore for MemoryStore {
    fn insert_one(&self, task: NewTask) -> Result<Task, StoreError> {
        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            category: task.category,
            completed: false,
            priority: task.priority,
            due_date: task.due_date,
            created_at: Utc::now(),
        };
        self.tasks
            .write()
            .map_err(poisoned)?
            .insert(task.id, task.clone());
        tracing::debug!(task_id = %task.id, "inserted task");
        Ok(task)
    }

    fn find_many(&self, filter: &TaskFilter, sort: TaskSort) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        let mut found: Vec<Task> = tasks.values().filter(|t| filter.matches(t)).cloned().collect();
        found.sort_by(|a, b| sort.compare(a, b));
        Ok(found)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn update_by_id(&self, id: Uuid, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        Ok(tasks.get_mut(&id).map(|task| {
            patch.apply(task);
            task.clone()
        }))
    }

    fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tasks.write().map_err(poisoned)?.remove(&id).is_some())
    }

    fn count(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.values().filter(|t| filter.matches(t)).count() as u64)
    }

    fn group_count_by(&self, field: TaskField) -> Result<BTreeMap<String, u64>, StoreError> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        let mut groups = BTreeMap::new();
        for task in tasks.values() {
            *groups.entry(field.key(task)).or_insert(0) += 1;
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortOrder;

    fn new_task(title: &str, category: &str) -> NewTask {
        NewTask {
            category: category.to_string(),
            ..NewTask::titled(title)
        }
    }

    #[test]
    fn insert_assigns_identity_and_defaults() {
        let store = MemoryStore::default();
        let task = store.insert_one(NewTask::titled("Buy milk")).unwrap();
        assert!(!task.completed);
        assert_eq!(store.find_by_id(task.id).unwrap(), Some(task));
    }

    #[test]
    fn update_missing_id_leaves_store_unchanged() {
        let store = MemoryStore::default();
        store.insert_one(NewTask::titled("a")).unwrap();
        let patch = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };
        assert!(store.update_by_id(Uuid::nil(), &patch).unwrap().is_none());
        assert_eq!(store.count(&TaskFilter::completed(true)).unwrap(), 0);
    }

    #[test]
    fn delete_reports_presence() {
        let store = MemoryStore::default();
        let task = store.insert_one(NewTask::titled("a")).unwrap();
        assert!(store.delete_by_id(task.id).unwrap());
        assert!(!store.delete_by_id(task.id).unwrap());
        assert!(store.find_by_id(task.id).unwrap().is_none());
    }

    #[test]
    fn find_many_filters_and_sorts() {
        let store = MemoryStore::default();
        store.insert_one(new_task("b", "work")).unwrap();
        store.insert_one(new_task("a", "work")).unwrap();
        store.insert_one(new_task("c", "home")).unwrap();

        let filter = TaskFilter {
            completed: None,
            category: Some("work".to_string()),
        };
        let sort = TaskSort {
            field: Some(TaskField::Title),
            order: SortOrder::Asc,
        };
        let titles: Vec<_> = store
            .find_many(&filter, sort)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn group_count_covers_every_category() {
        let store = MemoryStore::default();
        store.insert_one(new_task("a", "work")).unwrap();
        store.insert_one(new_task("b", "work")).unwrap();
        store.insert_one(new_task("c", "shopping")).unwrap();

        let groups = store.group_count_by(TaskField::Category).unwrap();
        assert_eq!(groups.get("work"), Some(&2));
        assert_eq!(groups.get("shopping"), Some(&1));
        assert_eq!(groups.values().sum::<u64>(), store.count(&TaskFilter::default()).unwrap());
    }
}
