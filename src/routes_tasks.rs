// --------------------------------------------------
// Handles API endpoints for task CRUD operations.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Validate incoming payloads before they reach the store
// --------------------------------------------------

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{Priority, Task};
use crate::store::{AppState, TaskRepo};

fn parse_due_at(due_at: &Option<String>) -> Result<Option<DateTime<Utc>>, ()> {
    match due_at {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ()),
    }
}

// -----------------------------
// GET /api/tasks
// Returns all stored tasks
// -----------------------------
pub async fn get_tasks(State(state): State<AppState>) -> impl IntoResponse {
    let repo = state.repo.lock().unwrap();
    Json(repo.list()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub priority: Priority,
    pub due_at: Option<String>, // RFC3339
    pub duration_min: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

// -----------------------------
// POST /api/tasks
// Creates a new task
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTaskInput>,
) -> impl IntoResponse {
    if input.title.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "title required").into_response();
    }
    if matches!(input.duration_min, Some(d) if d <= 0) {
        return (StatusCode::BAD_REQUEST, "duration_min must be positive").into_response();
    }
    let Ok(due_at) = parse_due_at(&input.due_at) else {
        return (StatusCode::BAD_REQUEST, "invalid due_at").into_response();
    };

    let task = Task {
        id: Uuid::new_v4(),
        title: input.title,
        priority: input.priority,
        due_at,
        duration_min: input.duration_min,
        scheduled_start: None,
        scheduled_end: None,
        created_at: Utc::now(),
        tags: input.tags,
        notes: input.notes,
    };

    let mut repo = state.repo.lock().unwrap();
    repo.upsert(task.clone());

    Json(task).into_response()
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskInput {
    pub title: String,
    pub priority: Priority,
    pub due_at: Option<String>, // RFC3339
    pub duration_min: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

// -----------------------------
// PUT /api/tasks/:id
// Updates an existing task by ID
// -----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTaskInput>,
) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    if input.title.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "title required").into_response();
    }
    if matches!(input.duration_min, Some(d) if d <= 0) {
        return (StatusCode::BAD_REQUEST, "duration_min must be positive").into_response();
    }
    let Ok(due_at) = parse_due_at(&input.due_at) else {
        return (StatusCode::BAD_REQUEST, "invalid due_at").into_response();
    };

    let mut repo = state.repo.lock().unwrap();
    let Some(mut task) = repo.get(id) else {
        return (StatusCode::NOT_FOUND, "task not found").into_response();
    };

    task.title = input.title;
    task.priority = input.priority;
    task.due_at = due_at;
    task.duration_min = input.duration_min;
    task.tags = input.tags;
    task.notes = input.notes;

    repo.upsert(task.clone());

    Json(task).into_response()
}

// -----------------------------
// DELETE /api/tasks/:id
// Removes a task permanently
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    let mut repo = state.repo.lock().unwrap();
    if !repo.remove(id) {
        return (StatusCode::NOT_FOUND, "task not found").into_response();
    }

    Json(serde_json::json!({ "ok": true })).into_response()
}
