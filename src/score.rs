/*
Scoring and deadline-feasibility logic.
Module was independently written from HTTP / storage for testing.
*/

use chrono::{DateTime, Utc};

use crate::models::{Priority, Task};
use crate::slots::{self, WorkingHours};

pub const DEFAULT_DURATION_MIN: i64 = 60;

pub fn estimated_duration(task: &Task) -> i64 {
    task.duration_min.unwrap_or(DEFAULT_DURATION_MIN)
}

// urgency (0..10):
// overdue -> 10
// <1 day: 8, 1-<3: 6, 3-<7: 4, 7-<14: 2, >=14: 1
// no due date -> 0
pub fn urgency_score(due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(due) = due_at else {
        return 0;
    };
    if due < now {
        return 10;
    }
    let days = (due - now).num_days();
    if days < 1 {
        8
    } else if days < 3 {
        6
    } else if days < 7 {
        4
    } else if days < 14 {
        2
    } else {
        1
    }
}

// Combined score used both for placement order (descending) and, by default,
// for deciding which of two colliding tasks yields.
pub fn task_score(task: &Task, now: DateTime<Utc>) -> i64 {
    task.priority.weight() * 10 + urgency_score(task.due_at, now)
}

// A Medium/High task ending after its due date fights for earlier slots even
// against higher-scored tasks. Low never qualifies; Urgent relies on plain
// priority ordering instead.
pub fn is_deadline_critical(task: &Task, candidate_end: DateTime<Utc>) -> bool {
    matches!(task.priority, Priority::Medium | Priority::High)
        && task.due_at.map(|due| candidate_end > due).unwrap_or(false)
}

// Whether the task's full duration still fits into working hours between
// `from` and its due date. Without a due date there is nothing to miss.
pub fn fits_before_due(task: &Task, from: DateTime<Utc>, hours: &WorkingHours) -> bool {
    match task.due_at {
        Some(due) => slots::working_minutes_between(from, due, hours) >= estimated_duration(task),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, min, 0).unwrap()
    }

    fn task(priority: Priority, due_at: Option<DateTime<Utc>>, duration_min: Option<i64>) -> Task {
        Task {
            id: Uuid::from_u128(1),
            title: "t".to_string(),
            priority,
            due_at,
            duration_min,
            scheduled_start: None,
            scheduled_end: None,
            created_at: at(1, 0, 0),
            tags: None,
            notes: None,
        }
    }

    #[test]
    fn urgency_buckets() {
        let now = at(2, 8, 0);
        assert_eq!(urgency_score(Some(now - Duration::minutes(1)), now), 10);
        assert_eq!(urgency_score(Some(now + Duration::hours(5)), now), 8);
        assert_eq!(urgency_score(Some(now + Duration::days(2)), now), 6);
        assert_eq!(urgency_score(Some(now + Duration::days(3)), now), 4);
        assert_eq!(urgency_score(Some(now + Duration::days(10)), now), 2);
        assert_eq!(urgency_score(Some(now + Duration::days(30)), now), 1);
        assert_eq!(urgency_score(None, now), 0);
    }

    #[test]
    fn score_combines_priority_and_urgency() {
        let now = at(2, 8, 0);
        let due_soon = Some(now + Duration::hours(3));
        assert_eq!(task_score(&task(Priority::Urgent, None, None), now), 40);
        assert_eq!(task_score(&task(Priority::Medium, due_soon, None), now), 28);
        assert_eq!(task_score(&task(Priority::Low, due_soon, None), now), 18);
        // An overdue Medium exactly ties a dateless High at 30; the tie is
        // settled downstream by the due-date ordering, not by the score.
        let overdue = Some(now - Duration::hours(1));
        assert_eq!(task_score(&task(Priority::Medium, overdue, None), now), 30);
        assert_eq!(task_score(&task(Priority::High, None, None), now), 30);
        // Any due date at all nudges the High back ahead.
        let far_due = Some(now + Duration::days(30));
        assert!(
            task_score(&task(Priority::High, far_due, None), now)
                > task_score(&task(Priority::Medium, overdue, None), now)
        );
    }

    #[test]
    fn criticality_needs_medium_or_high_past_due() {
        let due = at(2, 13, 0);
        let late = at(2, 14, 0);
        let on_time = at(2, 13, 0);

        assert!(is_deadline_critical(&task(Priority::Medium, Some(due), None), late));
        assert!(is_deadline_critical(&task(Priority::High, Some(due), None), late));
        assert!(!is_deadline_critical(&task(Priority::Low, Some(due), None), late));
        assert!(!is_deadline_critical(&task(Priority::Urgent, Some(due), None), late));
        // Ending exactly at the due date is still on time.
        assert!(!is_deadline_critical(&task(Priority::Medium, Some(due), None), on_time));
        assert!(!is_deadline_critical(&task(Priority::Medium, None, None), late));
    }

    #[test]
    fn fits_before_due_counts_working_minutes() {
        let hours = WorkingHours::new(9, 17);
        // Due 13:00, pushed to 11:00 -> 120 working minutes left.
        let t = task(Priority::Medium, Some(at(2, 13, 0)), Some(120));
        assert!(fits_before_due(&t, at(2, 11, 0), &hours));
        assert!(!fits_before_due(&t, at(2, 11, 30), &hours));
    }

    #[test]
    fn fits_before_due_spans_overnight() {
        let hours = WorkingHours::new(9, 17);
        // Due next day 10:00, pushed to 16:00 -> 60 + 60 working minutes left.
        let t = task(Priority::High, Some(at(3, 10, 0)), Some(120));
        assert!(fits_before_due(&t, at(2, 16, 0), &hours));
        let longer = task(Priority::High, Some(at(3, 10, 0)), Some(121));
        assert!(!fits_before_due(&longer, at(2, 16, 0), &hours));
    }

    #[test]
    fn no_due_date_always_fits() {
        let hours = WorkingHours::new(9, 17);
        let t = task(Priority::High, None, Some(480));
        assert!(fits_before_due(&t, at(2, 16, 59), &hours));
    }

    #[test]
    fn default_duration_is_an_hour() {
        assert_eq!(estimated_duration(&task(Priority::Low, None, None)), 60);
        assert_eq!(estimated_duration(&task(Priority::Low, None, Some(90))), 90);
    }
}
