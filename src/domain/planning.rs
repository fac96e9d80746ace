use super::{new_id, require_text};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A long-term vision statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vision {
    pub id: String,
    pub text: String,
    /// Free-form label such as "Q4 2025"; never parsed as a date
    #[serde(default)]
    pub timeline: String,
}

impl Vision {
    pub fn create(text: &str, timeline: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id(),
            text: require_text("text", text)?,
            timeline: timeline.trim().to_string(),
        })
    }

    pub fn edited(&self, text: &str, timeline: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: self.id.clone(),
            text: require_text("text", text)?,
            timeline: timeline.trim().to_string(),
        })
    }
}

/// A strategic goal with its ordered plan of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub plans: Vec<String>,
}

/// Split line-delimited text into trimmed, non-blank entries
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop blank entries and trim the rest
pub fn clean_plans<I, S>(plans: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    plans
        .into_iter()
        .flat_map(|p| split_lines(p.as_ref()))
        .collect()
}

impl Goal {
    pub fn create(title: &str, timeline: &str, plans: Vec<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id(),
            title: require_text("title", title)?,
            timeline: timeline.trim().to_string(),
            plans: clean_plans(plans),
        })
    }

    pub fn edited(&self, title: &str, timeline: &str, plans: Vec<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: self.id.clone(),
            title: require_text("title", title)?,
            timeline: timeline.trim().to_string(),
            plans: clean_plans(plans),
        })
    }
}
