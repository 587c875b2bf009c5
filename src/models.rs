use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    // Weight feeding the combined score: score = weight * 10 + urgency
    pub fn weight(&self) -> i64 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub priority: Priority,
    pub due_at: Option<DateTime<Utc>>,
    pub duration_min: Option<i64>, // minutes; the scheduler assumes 60 when absent
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

// One scheduling run: which tasks to (re)place and inside which window.
// The window is inclusive; the scheduler normalizes start_date to the start
// of its day and end_date to the end of its day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub task_ids: Vec<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub working_hours_start: u32, // 0..=23
    pub working_hours_end: u32,   // 1..=24, greater than working_hours_start
}

// A task with the concrete times the scheduler assigned to it.
// The embedded task is returned unchanged; start/end are the new placement.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledTask {
    pub task: Task,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
