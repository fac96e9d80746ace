use serde::{Deserialize, Serialize};

/// Task categories offered out of the box. More can be added through configuration.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Work", "Personal", "Learning", "Health", "Finances", "Social", "Vision",
];

/// Completion status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    /// The status a toggle moves to
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// How much time finishing a task is expected to free up later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeSavingPotential {
    #[serde(rename = "very much")]
    VeryMuch,
    #[default]
    #[serde(rename = "not much")]
    NotMuch,
    #[serde(rename = "may not save")]
    MayNotSave,
}

impl TimeSavingPotential {
    /// Parse the wire label ("very much", "not much", "may not save").
    /// Hyphens and underscores are accepted in place of spaces.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "very much" => Some(Self::VeryMuch),
            "not much" => Some(Self::NotMuch),
            "may not save" => Some(Self::MayNotSave),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryMuch => "very much",
            Self::NotMuch => "not much",
            Self::MayNotSave => "may not save",
        }
    }
}

/// Whether a submitted form creates a new entity or replaces an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create,
    Edit(String),
}
