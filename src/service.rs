/*
Caller side of the scheduler contract: resolve every requested task id,
invoke the pure core, persist the assigned times, report what was skipped.
*/

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{ScheduleRequest, ScheduledTask};
use crate::scheduler;
use crate::store::TaskRepo;

#[derive(Debug, PartialEq, Eq)]
pub enum ScheduleError {
    UnknownTask(Uuid),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::UnknownTask(id) => write!(f, "unknown task id {id}"),
        }
    }
}

#[derive(Debug)]
pub struct ScheduleOutcome {
    pub scheduled: Vec<ScheduledTask>,
    // Requested tasks the scheduler found no slot for. Not an error; the
    // core omits them silently and callers surface the diff.
    pub skipped: Vec<Uuid>,
}

// Run one scheduling pass against the repository. The whole request is
// rejected if any id does not resolve; otherwise the returned assignments
// are written back onto the stored tasks.
pub fn run_schedule<R: TaskRepo>(
    repo: &mut R,
    req: &ScheduleRequest,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome, ScheduleError> {
    for id in &req.task_ids {
        if repo.get(*id).is_none() {
            return Err(ScheduleError::UnknownTask(*id));
        }
    }

    let tasks = repo.list();
    let scheduled = scheduler::schedule_tasks(&tasks, req, now);

    for item in &scheduled {
        let mut task = item.task.clone();
        task.scheduled_start = Some(item.start);
        task.scheduled_end = Some(item.end);
        repo.upsert(task);
    }

    let placed: HashSet<Uuid> = scheduled.iter().map(|s| s.task.id).collect();
    let skipped = req
        .task_ids
        .iter()
        .copied()
        .filter(|id| !placed.contains(id))
        .collect();

    Ok(ScheduleOutcome { scheduled, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Task};
    use crate::store::MemRepo;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn task(id: u128, duration_min: Option<i64>) -> Task {
        Task {
            id: Uuid::from_u128(id),
            title: format!("task-{id}"),
            priority: Priority::Medium,
            due_at: None,
            duration_min,
            scheduled_start: None,
            scheduled_end: None,
            created_at: at(1, 0),
            tags: None,
            notes: None,
        }
    }

    fn request(ids: &[u128], end_hour: u32) -> ScheduleRequest {
        ScheduleRequest {
            task_ids: ids.iter().map(|&i| Uuid::from_u128(i)).collect(),
            start_date: at(2, 0),
            end_date: at(2, 0),
            working_hours_start: 9,
            working_hours_end: end_hour,
        }
    }

    #[test]
    fn unknown_id_rejects_the_whole_request() {
        let mut repo = MemRepo::new();
        repo.upsert(task(1, None));

        let err = run_schedule(&mut repo, &request(&[1, 2], 17), at(2, 8)).unwrap_err();
        assert_eq!(err, ScheduleError::UnknownTask(Uuid::from_u128(2)));
        // Nothing was written back.
        assert!(repo.get(Uuid::from_u128(1)).unwrap().scheduled_start.is_none());
    }

    #[test]
    fn assigned_times_are_written_back() {
        let mut repo = MemRepo::new();
        repo.upsert(task(1, Some(90)));

        let outcome = run_schedule(&mut repo, &request(&[1], 17), at(2, 8)).unwrap();
        assert_eq!(outcome.scheduled.len(), 1);
        assert!(outcome.skipped.is_empty());

        let stored = repo.get(Uuid::from_u128(1)).unwrap();
        assert_eq!(stored.scheduled_start, Some(at(2, 9)));
        assert_eq!(stored.scheduled_end, Some(outcome.scheduled[0].end));
    }

    #[test]
    fn unplaceable_tasks_are_reported_as_skipped() {
        let mut repo = MemRepo::new();
        repo.upsert(task(1, Some(60)));
        repo.upsert(task(2, Some(60)));

        // One working hour in the whole window: only one task fits.
        let outcome = run_schedule(&mut repo, &request(&[1, 2], 10), at(2, 8)).unwrap();
        assert_eq!(outcome.scheduled.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);

        let skipped = repo.get(outcome.skipped[0]).unwrap();
        assert!(skipped.scheduled_start.is_none());
    }

    #[test]
    fn fixed_tasks_outside_the_request_are_untouched() {
        let mut repo = MemRepo::new();
        let mut fixed = task(9, Some(60));
        fixed.scheduled_start = Some(at(2, 9));
        fixed.scheduled_end = Some(at(2, 10));
        repo.upsert(fixed);
        repo.upsert(task(1, Some(60)));

        let outcome = run_schedule(&mut repo, &request(&[1], 17), at(2, 8)).unwrap();
        assert_eq!(outcome.scheduled.len(), 1);
        // The new task queues behind the fixed obligation.
        assert_eq!(outcome.scheduled[0].start, at(2, 10));

        let stored = repo.get(Uuid::from_u128(9)).unwrap();
        assert_eq!(stored.scheduled_start, Some(at(2, 9)));
        assert_eq!(stored.scheduled_end, Some(at(2, 10)));
    }
}
