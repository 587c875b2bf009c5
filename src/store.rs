use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::models::Task;

// Repository seam between the HTTP layer and the scheduler. The scheduler
// itself never touches this; callers resolve tasks up front and write the
// assigned times back afterwards.
pub trait TaskRepo {
    fn get(&self, id: Uuid) -> Option<Task>;
    fn list(&self) -> Vec<Task>;
    fn upsert(&mut self, task: Task);
    fn remove(&mut self, id: Uuid) -> bool;
}

// In-memory task store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemRepo {
    tasks: HashMap<Uuid, Task>,
}

impl MemRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepo for MemRepo {
    fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    fn list(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    fn upsert(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    fn remove(&mut self, id: Uuid) -> bool {
        self.tasks.remove(&id).is_some()
    }
}

// Shared application state for the axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Mutex<MemRepo>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            repo: Arc::new(Mutex::new(MemRepo::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{TimeZone, Utc};

    fn task(id: u128) -> Task {
        Task {
            id: Uuid::from_u128(id),
            title: format!("task-{id}"),
            priority: Priority::Medium,
            due_at: None,
            duration_min: None,
            scheduled_start: None,
            scheduled_end: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            tags: None,
            notes: None,
        }
    }

    #[test]
    fn upsert_then_get_and_remove() {
        let mut repo = MemRepo::new();
        repo.upsert(task(1));
        repo.upsert(task(2));

        assert_eq!(repo.list().len(), 2);
        assert!(repo.get(Uuid::from_u128(1)).is_some());
        assert!(repo.get(Uuid::from_u128(3)).is_none());

        assert!(repo.remove(Uuid::from_u128(1)));
        assert!(!repo.remove(Uuid::from_u128(1)));
        assert_eq!(repo.list().len(), 1);
    }

    #[test]
    fn upsert_replaces_existing() {
        let mut repo = MemRepo::new();
        repo.upsert(task(1));
        let mut updated = task(1);
        updated.title = "renamed".to_string();
        repo.upsert(updated);

        assert_eq!(repo.list().len(), 1);
        assert_eq!(repo.get(Uuid::from_u128(1)).unwrap().title, "renamed");
    }
}
