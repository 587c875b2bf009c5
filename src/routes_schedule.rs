// --------------------------------------------------
// Handles the scheduling API endpoint.
//
// Responsibilities:
// - Validate the scheduling request (ids, window, working hours)
// - Invoke the scheduling service with the wall-clock time
// - Report placed assignments and skipped task ids
// --------------------------------------------------

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ScheduleRequest;
use crate::service;
use crate::store::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleInput {
    pub task_ids: Vec<String>,
    pub start_date: String, // RFC3339
    pub end_date: String,   // RFC3339
    pub working_hours_start: u32,
    pub working_hours_end: u32,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub scheduled: Vec<ScheduledItemResponse>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledItemResponse {
    pub task_id: String,
    pub title: String,
    pub start: String,
    pub end: String,
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// -----------------------------
// POST /api/schedule
// Runs one scheduling pass over the requested tasks
// -----------------------------
pub async fn post_schedule(
    State(state): State<AppState>,
    Json(input): Json<ScheduleInput>,
) -> impl IntoResponse {
    if input.task_ids.is_empty() {
        return (StatusCode::BAD_REQUEST, "task_ids required").into_response();
    }

    let mut task_ids = Vec::with_capacity(input.task_ids.len());
    for raw in &input.task_ids {
        match Uuid::parse_str(raw) {
            Ok(id) => task_ids.push(id),
            Err(_) => return (StatusCode::BAD_REQUEST, "invalid task id").into_response(),
        }
    }

    let Some(start_date) = parse_rfc3339(&input.start_date) else {
        return (StatusCode::BAD_REQUEST, "invalid start_date").into_response();
    };
    let Some(end_date) = parse_rfc3339(&input.end_date) else {
        return (StatusCode::BAD_REQUEST, "invalid end_date").into_response();
    };
    if end_date < start_date {
        return (StatusCode::BAD_REQUEST, "end_date before start_date").into_response();
    }

    if input.working_hours_start > 23
        || input.working_hours_end > 24
        || input.working_hours_start >= input.working_hours_end
    {
        return (StatusCode::BAD_REQUEST, "invalid working hours").into_response();
    }

    let req = ScheduleRequest {
        task_ids,
        start_date,
        end_date,
        working_hours_start: input.working_hours_start,
        working_hours_end: input.working_hours_end,
    };

    let now = Utc::now();
    let mut repo = state.repo.lock().unwrap();

    match service::run_schedule(&mut *repo, &req, now) {
        Ok(outcome) => {
            let scheduled = outcome
                .scheduled
                .into_iter()
                .map(|s| ScheduledItemResponse {
                    task_id: s.task.id.to_string(),
                    title: s.task.title,
                    start: s.start.to_rfc3339(),
                    end: s.end.to_rfc3339(),
                })
                .collect();
            let skipped = outcome.skipped.iter().map(Uuid::to_string).collect();

            Json(ScheduleResponse { scheduled, skipped }).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}
