//! Task ordering for the task list and the notification panel.
//!
//! Display order: pending before completed, then serious before non-serious, then
//! earliest deadline first. Ties keep their position in the collection.

use super::enums::TaskStatus;
use super::task::Task;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

/// How far ahead a deadline pulls a task into the notification set
pub const NOTIFICATION_WINDOW_HOURS: i64 = 24;

fn status_rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Pending => 0,
        TaskStatus::Completed => 1,
    }
}

/// Comparator behind [`display_order`]
pub fn display_cmp(a: &Task, b: &Task) -> Ordering {
    status_rank(a.status)
        .cmp(&status_rank(b.status))
        .then_with(|| b.is_serious.cmp(&a.is_serious))
        .then_with(|| a.deadline.cmp(&b.deadline))
}

/// All tasks in display order
pub fn display_order(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by(|a, b| display_cmp(a, b));
    ordered
}

/// Why a task is in the notification set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Deadline already passed
    Overdue,
    /// Flagged serious, deadline not yet passed
    Critical,
    /// Deadline within the notification window
    StartingSoon,
}

impl NotificationKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overdue => "OVERDUE",
            Self::Critical => "CRITICAL TASK",
            Self::StartingSoon => "STARTING SOON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notification<'a> {
    pub task: &'a Task,
    pub kind: NotificationKind,
}

/// Classify one task, `None` when it does not belong in the notification set
pub fn notification_kind(task: &Task, now: DateTime<Utc>) -> Option<NotificationKind> {
    if !task.status.is_pending() {
        return None;
    }
    if task.deadline < now {
        Some(NotificationKind::Overdue)
    } else if task.is_serious {
        Some(NotificationKind::Critical)
    } else if task.deadline < now + Duration::hours(NOTIFICATION_WINDOW_HOURS) {
        Some(NotificationKind::StartingSoon)
    } else {
        None
    }
}

/// Pending tasks that are due soon, overdue, or serious, earliest deadline first.
/// Recomputed from scratch on every call.
pub fn notification_set(tasks: &[Task], now: DateTime<Utc>) -> Vec<Notification<'_>> {
    let mut set: Vec<Notification<'_>> = tasks
        .iter()
        .filter_map(|task| notification_kind(task, now).map(|kind| Notification { task, kind }))
        .collect();
    set.sort_by(|a, b| a.task.deadline.cmp(&b.task.deadline));
    set
}
