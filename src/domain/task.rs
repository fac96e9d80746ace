use super::enums::{TaskStatus, TimeSavingPotential};
use super::{new_id, require_text, timestamp};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest urgency/importance level
pub const MIN_LEVEL: u8 = 1;
/// Highest urgency/importance level
pub const MAX_LEVEL: u8 = 5;
/// Level used when a form leaves urgency or importance unset
pub const DEFAULT_LEVEL: u8 = 3;

/// Clamp an arbitrary integer into the 1-5 level range
pub fn clamp_level(value: i64) -> u8 {
    value.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8
}

/// Estimated effort, split the way it is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EstimatedTime {
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
}

impl EstimatedTime {
    pub fn new(days: u32, hours: u32, minutes: u32) -> Self {
        Self { days, hours, minutes }
    }

    /// Format as "1d 2h 30m", omitting zero parts ("0m" when everything is zero)
    pub fn formatted(&self) -> String {
        let mut parts = Vec::new();
        if self.days > 0 {
            parts.push(format!("{}d", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{}h", self.hours));
        }
        if self.minutes > 0 {
            parts.push(format!("{}m", self.minutes));
        }
        if parts.is_empty() {
            "0m".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// A dated unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(with = "timestamp")]
    pub deadline: DateTime<Utc>,
    /// Stored and shown, but never consulted for ordering or notifications
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub probable_completion: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_time: EstimatedTime,
    pub urgency: u8,
    pub importance: u8,
    #[serde(default)]
    pub time_saving: TimeSavingPotential,
    #[serde(default)]
    pub is_serious: bool,
    /// Hours actually spent, recorded after completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_time_taken: Option<f64>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// The editable fields of a task, as submitted by a form
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub category: String,
    pub deadline: DateTime<Utc>,
    pub probable_completion: Option<DateTime<Utc>>,
    pub estimated_time: EstimatedTime,
    pub urgency: i64,
    pub importance: i64,
    pub time_saving: TimeSavingPotential,
    pub is_serious: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, category: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            deadline,
            probable_completion: None,
            estimated_time: EstimatedTime::default(),
            urgency: DEFAULT_LEVEL as i64,
            importance: DEFAULT_LEVEL as i64,
            time_saving: TimeSavingPotential::default(),
            is_serious: false,
        }
    }

    /// Draft pre-filled from an existing task, for partial edits
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            category: task.category.clone(),
            deadline: task.deadline,
            probable_completion: task.probable_completion,
            estimated_time: task.estimated_time,
            urgency: task.urgency as i64,
            importance: task.importance as i64,
            time_saving: task.time_saving,
            is_serious: task.is_serious,
        }
    }

    /// Check required fields against the allowed categories.
    /// `current_category` is accepted even when it is no longer configured.
    fn check(&self, categories: &[String], current_category: Option<&str>) -> Result<String, ValidationError> {
        let title = require_text("title", &self.title)?;
        let category = self.category.trim();
        let known = categories.iter().any(|c| c == category) || current_category == Some(category);
        if !known {
            return Err(ValidationError::UnknownCategory(category.to_string()));
        }
        Ok(title)
    }
}

impl Task {
    /// Build a fresh pending task from a validated draft
    pub fn create(draft: TaskDraft, categories: &[String], now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let title = draft.check(categories, None)?;
        Ok(Self {
            id: new_id(),
            title,
            category: draft.category.trim().to_string(),
            deadline: draft.deadline,
            probable_completion: draft.probable_completion,
            estimated_time: draft.estimated_time,
            urgency: clamp_level(draft.urgency),
            importance: clamp_level(draft.importance),
            time_saving: draft.time_saving,
            is_serious: draft.is_serious,
            actual_time_taken: None,
            completed_at: None,
            status: TaskStatus::Pending,
            created_at: now,
        })
    }

    /// Replace the editable fields, keeping identity, status and completion data
    pub fn edited(&self, draft: TaskDraft, categories: &[String]) -> Result<Self, ValidationError> {
        let title = draft.check(categories, Some(&self.category))?;
        Ok(Self {
            title,
            category: draft.category.trim().to_string(),
            deadline: draft.deadline,
            probable_completion: draft.probable_completion,
            estimated_time: draft.estimated_time,
            urgency: clamp_level(draft.urgency),
            importance: clamp_level(draft.importance),
            time_saving: draft.time_saving,
            is_serious: draft.is_serious,
            ..self.clone()
        })
    }

    /// Flip pending/completed, stamping or clearing `completed_at`
    pub fn toggled(&self, now: DateTime<Utc>) -> Self {
        let status = self.status.toggled();
        Self {
            status,
            completed_at: match status {
                TaskStatus::Completed => Some(now),
                TaskStatus::Pending => None,
            },
            ..self.clone()
        }
    }

    /// Record (or clear, with `None`) the hours actually spent
    pub fn with_actual_time(&self, hours: Option<f64>) -> Result<Self, ValidationError> {
        if self.status != TaskStatus::Completed {
            return Err(ValidationError::NotCompleted);
        }
        if let Some(h) = hours {
            if !h.is_finite() || h < 0.0 {
                return Err(ValidationError::InvalidActualTime(h));
            }
        }
        Ok(Self {
            actual_time_taken: hours,
            ..self.clone()
        })
    }

    /// Probable completion, falling back to the deadline
    pub fn probable_completion(&self) -> DateTime<Utc> {
        self.probable_completion.unwrap_or(self.deadline)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_pending() && self.deadline < now
    }

    /// Restore the completion invariant on data that came from outside.
    /// A completed task without a stamp gets its creation time.
    pub fn normalized(mut self) -> Self {
        self.urgency = clamp_level(self.urgency as i64);
        self.importance = clamp_level(self.importance as i64);
        match self.status {
            TaskStatus::Pending => self.completed_at = None,
            TaskStatus::Completed => {
                if self.completed_at.is_none() {
                    self.completed_at = Some(self.created_at);
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn categories() -> Vec<String> {
        vec!["Work".to_string(), "Health".to_string()]
    }

    fn now() -> DateTime<Utc> {
        timestamp::parse_timestamp("2025-06-01T09:00:00Z").unwrap()
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft::new(title, "Work", now() + Duration::hours(3))
    }

    #[test]
    fn test_create_defaults() {
        let task = Task::create(draft("Write report"), &categories(), now()).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, now());
        assert!(task.probable_completion.is_none());
        assert_eq!(task.probable_completion(), task.deadline);
        assert!(task.completed_at.is_none());
        assert!(!task.id.is_empty());
    }

    #[test]
    fn test_create_trims_and_rejects_blank_title() {
        let task = Task::create(draft("  Gym  "), &categories(), now()).unwrap();
        assert_eq!(task.title, "Gym");

        let err = Task::create(draft("   "), &categories(), now()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("title"));
    }

    #[test]
    fn test_create_rejects_unknown_category() {
        let mut d = draft("Taxes");
        d.category = "Finances".to_string();
        let err = Task::create(d, &categories(), now()).unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("Finances".to_string()));
    }

    #[test]
    fn test_levels_are_clamped() {
        let mut d = draft("Clamp");
        d.urgency = 9;
        d.importance = -2;
        let task = Task::create(d, &categories(), now()).unwrap();
        assert_eq!(task.urgency, MAX_LEVEL);
        assert_eq!(task.importance, MIN_LEVEL);
    }

    #[test]
    fn test_edit_preserves_identity_and_completion() {
        let task = Task::create(draft("Original"), &categories(), now()).unwrap();
        let done = task.toggled(now()).with_actual_time(Some(1.5)).unwrap();

        let mut d = TaskDraft::from_task(&done);
        d.title = "Renamed".to_string();
        d.is_serious = true;
        let edited = done.edited(d, &categories()).unwrap();

        assert_eq!(edited.id, task.id);
        assert_eq!(edited.created_at, task.created_at);
        assert_eq!(edited.status, TaskStatus::Completed);
        assert_eq!(edited.completed_at, done.completed_at);
        assert_eq!(edited.actual_time_taken, Some(1.5));
        assert_eq!(edited.title, "Renamed");
        assert!(edited.is_serious);
    }

    #[test]
    fn test_edit_moves_default_probable_completion_with_deadline() {
        let task = Task::create(draft("Plan trip"), &categories(), now()).unwrap();
        let mut d = TaskDraft::from_task(&task);
        d.deadline = now() + Duration::days(30);
        let moved = task.edited(d, &categories()).unwrap();

        assert!(moved.probable_completion.is_none());
        assert_eq!(moved.probable_completion(), now() + Duration::days(30));
        let json = serde_json::to_string(&moved).unwrap();
        assert!(!json.contains("probableCompletion"));

        let mut d = TaskDraft::from_task(&moved);
        d.probable_completion = Some(now() + Duration::days(20));
        d.deadline = now() + Duration::days(40);
        let pinned = moved.edited(d, &categories()).unwrap();
        assert_eq!(pinned.probable_completion(), now() + Duration::days(20));
    }

    #[test]
    fn test_edit_keeps_retired_category() {
        let mut task = Task::create(draft("Old"), &categories(), now()).unwrap();
        task.category = "Retired".to_string();
        let edited = task.edited(TaskDraft::from_task(&task), &categories()).unwrap();
        assert_eq!(edited.category, "Retired");
    }

    #[test]
    fn test_completion_invariant_over_toggles() {
        let mut task = Task::create(draft("Toggle"), &categories(), now()).unwrap();
        for step in 0..6 {
            task = task.toggled(now() + Duration::minutes(step));
            assert_eq!(
                task.completed_at.is_some(),
                task.status == TaskStatus::Completed,
                "invariant broken after toggle {}",
                step
            );
        }
        let done = task.toggled(now());
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.completed_at, Some(now()));
    }

    #[test]
    fn test_actual_time_requires_completion() {
        let task = Task::create(draft("Pending"), &categories(), now()).unwrap();
        assert_eq!(task.with_actual_time(Some(2.0)).unwrap_err(), ValidationError::NotCompleted);

        let done = task.toggled(now());
        assert_eq!(done.with_actual_time(Some(2.0)).unwrap().actual_time_taken, Some(2.0));
        assert!(matches!(
            done.with_actual_time(Some(-1.0)),
            Err(ValidationError::InvalidActualTime(_))
        ));
        assert!(done.with_actual_time(Some(f64::NAN)).is_err());
        assert_eq!(done.with_actual_time(None).unwrap().actual_time_taken, None);
    }

    #[test]
    fn test_estimated_time_formatted() {
        assert_eq!(EstimatedTime::new(1, 2, 30).formatted(), "1d 2h 30m");
        assert_eq!(EstimatedTime::new(0, 4, 0).formatted(), "4h");
        assert_eq!(EstimatedTime::default().formatted(), "0m");
    }

    #[test]
    fn test_normalized_repairs_completion_stamp() {
        let mut task = Task::create(draft("Imported"), &categories(), now()).unwrap();
        task.status = TaskStatus::Completed;
        task.completed_at = None;
        task.urgency = 0;
        let fixed = task.normalized();
        assert_eq!(fixed.completed_at, Some(now()));
        assert_eq!(fixed.urgency, MIN_LEVEL);

        let mut pending = fixed.clone();
        pending.status = TaskStatus::Pending;
        assert!(pending.normalized().completed_at.is_none());
    }

    #[test]
    fn test_deserialize_stored_document_shape() {
        let json = r#"{
            "id": "abc",
            "title": "Ship it",
            "category": "Work",
            "deadline": "2025-06-01T18:00",
            "probableCompletion": "2025-06-01T17:00",
            "estimatedTime": { "days": 0, "hours": 2, "minutes": 15 },
            "urgency": 4,
            "importance": 5,
            "timeSaving": "very much",
            "isSerious": true,
            "status": "pending",
            "createdAt": "2025-05-30T08:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "abc");
        assert_eq!(task.estimated_time, EstimatedTime::new(0, 2, 15));
        assert_eq!(task.time_saving, TimeSavingPotential::VeryMuch);
        assert!(task.is_serious);
        assert!(task.completed_at.is_none());

        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back["createdAt"], "2025-05-30T08:00:00.000Z");
        assert_eq!(back["timeSaving"], "very much");
        assert!(back.get("completedAt").is_none());
    }
}
