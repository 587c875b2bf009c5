/*
Time-slot search.
Greedy forward scan over occupied intervals; written independently from
HTTP / storage for testing.
*/

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

// Occupied interval [start, end) belonging to one task, carrying that task's
// score so conflict resolution can compare without a lookup.
#[derive(Debug, Clone)]
pub struct TimeSlot {
    pub task_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub score: i64,
}

// Daily working-hour bounds, hour-of-day in UTC.
#[derive(Debug, Clone, Copy)]
pub struct WorkingHours {
    pub start_hour: u32, // 0..=23
    pub end_hour: u32,   // 1..=24
}

impl WorkingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self { start_hour, end_hour }
    }

    pub fn open(&self, day: NaiveDate) -> DateTime<Utc> {
        day_floor_date(day) + Duration::hours(self.start_hour as i64)
    }

    // end_hour 24 lands on the next midnight.
    pub fn close(&self, day: NaiveDate) -> DateTime<Utc> {
        day_floor_date(day) + Duration::hours(self.end_hour as i64)
    }
}

pub fn day_floor(at: DateTime<Utc>) -> DateTime<Utc> {
    day_floor_date(at.date_naive())
}

fn day_floor_date(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

// Half-open intervals: touching endpoints do not overlap.
pub fn overlaps(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

// Find the earliest interval of `duration_min` minutes at or after `from`
// that stays inside working hours and overlaps no occupied slot.
//
// Process:
// - Snap a candidate start before the day's opening hour forward to it
// - Roll a candidate that would run past the day's close to the next morning
// - On collision, jump to the latest end among all overlapping slots
// - Give up once the candidate start leaves the window
//
// This only scans forward over increasing start times; it never reorders
// what is already placed.
pub fn find_next_slot(
    from: DateTime<Utc>,
    duration_min: i64,
    occupied: &[TimeSlot],
    hours: &WorkingHours,
    window_end: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut start = from;

    loop {
        if start >= window_end {
            return None;
        }

        let open = hours.open(start.date_naive());
        if start < open {
            start = open;
        }

        let end = start + Duration::minutes(duration_min);
        if end > hours.close(start.date_naive()) {
            start = hours.open(start.date_naive() + Duration::days(1));
            continue;
        }

        let latest_conflict_end = occupied
            .iter()
            .filter(|s| overlaps(start, end, s.start, s.end))
            .map(|s| s.end)
            .max();

        match latest_conflict_end {
            None => return Some((start, end)),
            Some(latest) if latest > start => start = latest,
            // An overlapping slot always ends after the candidate start, so
            // this branch should not be reached; inch forward regardless.
            Some(_) => start += Duration::minutes(15),
        }
    }
}

// Minutes inside working hours between two instants. Used to decide whether
// a pushed-back task still fits before its due date.
pub fn working_minutes_between(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    hours: &WorkingHours,
) -> i64 {
    if to <= from {
        return 0;
    }

    let mut total = 0i64;
    let mut day = from.date_naive();
    let last = to.date_naive();

    while day <= last {
        let open = hours.open(day).max(from);
        let close = hours.close(day).min(to);
        if close > open {
            total += (close - open).num_minutes();
        }
        day += Duration::days(1);
    }

    total
}
