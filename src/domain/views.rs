use super::app_data::AppData;
use super::enums::TaskStatus;
use super::task::Task;
use chrono::{DateTime, Duration, Utc};

/// How close a pending task is to its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineState {
    Overdue,
    /// Due within the next two days
    Approaching,
    Comfortable,
}

/// Deadline state for a pending task, `None` once it is completed
pub fn deadline_state(task: &Task, now: DateTime<Utc>) -> Option<DeadlineState> {
    if task.status != TaskStatus::Pending {
        return None;
    }
    Some(if task.deadline < now {
        DeadlineState::Overdue
    } else if task.deadline < now + Duration::days(2) {
        DeadlineState::Approaching
    } else {
        DeadlineState::Comfortable
    })
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Rough human wording for a span of time ("less than a minute", "3 hours", "about 2 months")
pub fn humanize_duration(span: Duration) -> String {
    let minutes = span.num_minutes().abs();
    if minutes < 1 {
        "less than a minute".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if minutes < 60 * 24 {
        plural((minutes + 30) / 60, "hour")
    } else if minutes < 60 * 24 * 30 {
        plural((minutes + 60 * 12) / (60 * 24), "day")
    } else if minutes < 60 * 24 * 365 {
        format!("about {}", plural(minutes / (60 * 24 * 30), "month"))
    } else {
        format!("about {}", plural(minutes / (60 * 24 * 365), "year"))
    }
}

/// One-line deadline wording for a task card
pub fn deadline_label(task: &Task, now: DateTime<Utc>) -> Option<String> {
    match deadline_state(task, now)? {
        DeadlineState::Overdue => Some("OVERDUE".to_string()),
        _ => Some(format!("Deadline in {}", humanize_duration(task.deadline - now))),
    }
}

/// Status badge text
pub fn status_badge(task: &Task) -> &'static str {
    match task.status {
        TaskStatus::Pending if task.is_serious => "! PENDING",
        TaskStatus::Pending => "○ PENDING",
        TaskStatus::Completed => "✓ DONE",
    }
}

/// Headline counts for the whole document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
    pub serious_pending: usize,
    pub visions: usize,
    pub goals: usize,
    pub dossier_entries: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn of(data: &AppData, now: DateTime<Utc>) -> Self {
        let pending: Vec<&Task> = data.tasks.iter().filter(|t| t.status.is_pending()).collect();
        Self {
            pending: pending.len(),
            completed: data.tasks.len() - pending.len(),
            overdue: pending.iter().filter(|t| t.is_overdue(now)).count(),
            serious_pending: pending.iter().filter(|t| t.is_serious).count(),
            visions: data.visions.len(),
            goals: data.goals.len(),
            dossier_entries: data.personal_categories.iter().map(|c| c.node_count()).sum(),
            last_sync: data.last_sync,
        }
    }
}
