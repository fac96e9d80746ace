use super::dossier::PersonalCategory;
use super::planning::{Goal, Vision};
use super::task::Task;
use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The whole persisted document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub visions: Vec<Vision>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub personal_categories: Vec<PersonalCategory>,
    /// Set only by a successful remote save
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl AppData {
    /// Parse a document and restore the task completion invariant
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let data: AppData = serde_json::from_str(json)?;
        Ok(data.normalized())
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn normalized(self) -> Self {
        Self {
            tasks: self.tasks.into_iter().map(Task::normalized).collect(),
            ..self
        }
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Copy of the document with `last_sync` cleared, for content comparisons
    #[cfg(test)]
    pub fn without_sync_stamp(&self) -> Self {
        Self {
            last_sync: None,
            ..self.clone()
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
            && self.visions.is_empty()
            && self.goals.is_empty()
            && self.personal_categories.is_empty()
    }
}
