// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::{DaySummary, Task};

/// How many minutes after its reminder instant a task keeps being reported.
pub const REMINDER_WINDOW_MINUTES: i64 = 60;

/// Tasks whose due date falls on `date`, in stored order. Time of day is ignored.
pub fn tasks_due_on(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.due_day() == date)
        .cloned()
        .collect()
}

pub fn find_by_id<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|task| task.id == id)
}

/// Replaces the first task carrying the same id as `updated`.
///
/// Later duplicates are left alone. Returns `false` (and changes nothing)
/// when no task has that id.
pub fn update_by_id(tasks: &mut [Task], updated: Task) -> bool {
    match tasks.iter_mut().find(|task| task.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Removes every task with the given id and returns how many went.
///
/// Unlike [`update_by_id`] this does not stop at the first match.
pub fn delete_by_id(tasks: &mut Vec<Task>, id: &str) -> usize {
    let before = tasks.len();
    tasks.retain(|task| task.id != id);
    before - tasks.len()
}

/// The absolute local instant a task's reminder fires at, if it has one.
pub fn reminder_instant(task: &Task) -> Option<NaiveDateTime> {
    task.reminder_time
        .map(|time| task.due_day().and_time(time.as_naive_time()))
}

/// Whether `task` should be notified at `now`.
///
/// True for an incomplete task whose reminder instant has been reached and
/// is less than [`REMINDER_WINDOW_MINUTES`] old. Nothing records that a
/// reminder was shown, so repeated checks inside the window keep returning true.
pub fn is_due_for_notification(task: &Task, now: NaiveDateTime) -> bool {
    if task.is_completed {
        return false;
    }
    match reminder_instant(task) {
        Some(instant) => {
            now >= instant && now - instant < Duration::minutes(REMINDER_WINDOW_MINUTES)
        }
        None => false,
    }
}

pub fn due_for_notification(tasks: &[Task], now: NaiveDateTime) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| is_due_for_notification(task, now))
        .cloned()
        .collect()
}

/// Per-day task counts for one calendar month, ascending by date.
/// Days without tasks are omitted.
pub fn day_summaries(tasks: &[Task], year: i32, month: u32) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();

    for task in tasks {
        let day = task.due_day();
        if day.year() != year || day.month() != month {
            continue;
        }
        let summary = days.entry(day).or_insert(DaySummary {
            date: day,
            total: 0,
            completed: 0,
        });
        summary.total += 1;
        if task.is_completed {
            summary.completed += 1;
        }
    }

    days.into_values().collect()
}
