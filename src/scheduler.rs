/*
Core scheduling loop: placement order, early-slot forcing, bumping and
rescheduling of evicted tasks.
Pure function over the task list; independent from HTTP / storage for testing.
*/

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Priority, ScheduleRequest, ScheduledTask, Task};
use crate::score;
use crate::slots::{self, TimeSlot, WorkingHours};

// Placement strategy picked per task before conflicts are examined.
// ForceEarly fights for the first working slot of the window; NextAvailable
// takes whatever the forward scan finds.
#[derive(Debug)]
enum Placement {
    ForceEarly {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        conflicts: Vec<TimeSlot>,
    },
    NextAvailable,
}

/// Assign concrete start/end times to every task named in the request.
///
/// `tasks` is the full task list; tasks that already carry scheduled times and
/// are not part of the request seed the occupied set as fixed obligations and
/// are never moved. Tasks that fit nowhere inside the window are silently
/// left out of the result.
pub fn schedule_tasks(
    tasks: &[Task],
    req: &ScheduleRequest,
    now: DateTime<Utc>,
) -> Vec<ScheduledTask> {
    let hours = WorkingHours::new(req.working_hours_start, req.working_hours_end);
    let window_start = slots::day_floor(req.start_date);
    let window_end = slots::day_floor(req.end_date) + Duration::days(1);

    let requested: HashSet<Uuid> = req.task_ids.iter().copied().collect();
    let by_id: HashMap<Uuid, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

    let mut occupied: Vec<TimeSlot> = tasks
        .iter()
        .filter(|t| !requested.contains(&t.id))
        .filter_map(|t| match (t.scheduled_start, t.scheduled_end) {
            (Some(start), Some(end)) => Some(TimeSlot {
                task_id: t.id,
                start,
                end,
                score: score::task_score(t, now),
            }),
            _ => None,
        })
        .collect();

    let mut to_schedule: Vec<&Task> = tasks.iter().filter(|t| requested.contains(&t.id)).collect();
    // Score descending; ties broken by earlier due date, then id, so a run is
    // deterministic regardless of input order.
    to_schedule.sort_by(|a, b| {
        score::task_score(b, now)
            .cmp(&score::task_score(a, now))
            .then_with(|| cmp_due(a.due_at, b.due_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut placed: Vec<ScheduledTask> = Vec::new();
    let mut evicted: Vec<Task> = Vec::new();

    for task in to_schedule {
        let duration = score::estimated_duration(task);
        let task_score = score::task_score(task, now);

        let placement =
            choose_placement(task, duration, &occupied, &hours, window_start, window_end, now);

        let (cand_start, cand_end, conflicts, forcing) = match placement {
            Placement::ForceEarly { start, end, conflicts } => (start, end, conflicts, true),
            Placement::NextAvailable => {
                match slots::find_next_slot(window_start, duration, &occupied, &hours, window_end) {
                    Some((start, end)) => (start, end, Vec::new(), false),
                    None => continue, // no room anywhere in the window
                }
            }
        };

        let mut critical = score::is_deadline_critical(task, cand_end);
        if forcing && !critical {
            // The forced slot itself meets the deadline; what matters is
            // whether falling back to the next opening would miss it.
            if let Some((_, probe_end)) =
                slots::find_next_slot(window_start, duration, &occupied, &hours, window_end)
            {
                critical = score::is_deadline_critical(task, probe_end);
            }
        }

        let victims = resolve_conflicts(
            task, task_score, critical, forcing, cand_end, &conflicts, &by_id, &requested, &hours,
            now,
        );

        // A forced attempt that cannot clear its whole path falls back to the
        // ordinary scan and bumps nothing.
        let (start, end) = if forcing && victims.len() < conflicts.len() {
            match slots::find_next_slot(window_start, duration, &occupied, &hours, window_end) {
                Some(slot) => slot,
                None => continue,
            }
        } else {
            for victim in &victims {
                occupied.retain(|s| s.task_id != *victim);
                if let Some(pos) = placed.iter().position(|p| p.task.id == *victim) {
                    evicted.push(placed.remove(pos).task);
                }
            }
            (cand_start, cand_end)
        };

        occupied.push(TimeSlot {
            task_id: task.id,
            start,
            end,
            score: task_score,
        });
        placed.push(ScheduledTask {
            task: task.clone(),
            start,
            end,
        });
    }

    // Second pass: find new homes for everything bumped out. A task that
    // still fits nowhere is dropped from the result.
    for task in evicted {
        let duration = score::estimated_duration(&task);
        if let Some((start, end)) =
            slots::find_next_slot(window_start, duration, &occupied, &hours, window_end)
        {
            occupied.push(TimeSlot {
                task_id: task.id,
                start,
                end,
                score: score::task_score(&task, now),
            });
            placed.push(ScheduledTask { task, start, end });
        }
    }

    placed
}

// Gate between the two placement strategies.
//
// Only Medium/High tasks with a due date ever force the early slot, and only
// when that slot is taken: either the task is due within a day, or letting it
// drift to the next opening would already miss its deadline.
fn choose_placement(
    task: &Task,
    duration: i64,
    occupied: &[TimeSlot],
    hours: &WorkingHours,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Placement {
    if !matches!(task.priority, Priority::Medium | Priority::High) {
        return Placement::NextAvailable;
    }
    let Some(due) = task.due_at else {
        return Placement::NextAvailable;
    };

    let early_start = hours.open(window_start.date_naive());
    let early_end = early_start + Duration::minutes(duration);
    let conflicts: Vec<TimeSlot> = occupied
        .iter()
        .filter(|s| slots::overlaps(early_start, early_end, s.start, s.end))
        .cloned()
        .collect();
    if conflicts.is_empty() {
        // Early slot is free; the ordinary scan lands there anyway.
        return Placement::NextAvailable;
    }

    let due_soon = due <= now + Duration::days(1);
    let forced = due_soon
        || match slots::find_next_slot(window_start, duration, occupied, hours, window_end) {
            Some((_, next_end)) => next_end > due,
            None => true,
        };

    if forced {
        Placement::ForceEarly {
            start: early_start,
            end: early_end,
            conflicts,
        }
    } else {
        Placement::NextAvailable
    }
}

// Decide which conflicting slots yield to the current task.
// Fixed obligations (not part of this request) never yield.
fn resolve_conflicts(
    task: &Task,
    task_score: i64,
    critical: bool,
    forcing: bool,
    cand_end: DateTime<Utc>,
    conflicts: &[TimeSlot],
    by_id: &HashMap<Uuid, &Task>,
    requested: &HashSet<Uuid>,
    hours: &WorkingHours,
    now: DateTime<Utc>,
) -> Vec<Uuid> {
    let mut victims = Vec::new();
    let due_soon = task
        .due_at
        .map(|due| due <= now + Duration::days(1))
        .unwrap_or(false);

    for slot in conflicts {
        if !requested.contains(&slot.task_id) {
            continue;
        }
        let Some(other) = by_id.get(&slot.task_id) else {
            continue;
        };
        let other_critical = score::is_deadline_critical(other, slot.end);

        let bump = if critical {
            if other_critical {
                wins_due_arbitration(task, cand_end, other, slot, hours)
            } else {
                // Bump anything that can be safely pushed: enough working
                // minutes remain after its current end to refit it on time.
                score::fits_before_due(other, slot.end, hours)
            }
        } else if due_soon && forcing {
            // Not yet critical, but due within a day: displace later-due
            // tasks that would survive the move.
            due_before(task.due_at, other.due_at)
                && score::fits_before_due(other, cand_end, hours)
                && score::fits_before_due(other, slot.end, hours)
        } else {
            // Standard case: only strictly lower scores yield, and a
            // deadline-critical task is never bumped by a non-critical one.
            !other_critical && slot.score < task_score
        };

        if bump {
            victims.push(slot.task_id);
        }
    }

    victims
}

// Due-time arbitration between two deadline-critical tasks. One-step
// look-ahead only: the immediate pair is simulated, never a cascade.
fn wins_due_arbitration(
    task: &Task,
    cand_end: DateTime<Utc>,
    other: &Task,
    slot: &TimeSlot,
    hours: &WorkingHours,
) -> bool {
    // Both sides are deadline-critical here, so both carry due dates.
    let (Some(task_due), Some(other_due)) = (task.due_at, other.due_at) else {
        return false;
    };

    if task_due < other_due {
        if cand_end > task_due {
            // Cannot meet the deadline even at the candidate slot; the
            // earlier due date wins outright.
            return true;
        }
        // Meets it here; only displace the other task if it would still
        // complete on time pushed right after this candidate.
        score::fits_before_due(other, cand_end, hours)
    } else {
        let other_on_time = slot.end <= other_due;
        let task_fits_after = slots::working_minutes_between(slot.end, task_due, hours)
            >= score::estimated_duration(task);
        if other_on_time && task_fits_after {
            return false; // the earlier-due incumbent keeps its slot
        }
        if !other_on_time {
            // The incumbent misses its deadline where it sits anyway; take
            // the slot if this task can actually meet its own.
            return cand_end <= task_due;
        }
        false
    }
}

fn cmp_due(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Earlier due date wins; a missing due date counts as later than any date.
fn due_before(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> bool {
    cmp_due(a, b) == Ordering::Less
}
