pub mod app_data;
pub mod dossier;
pub mod enums;
pub mod planning;
pub mod ranking;
pub mod task;
pub mod timestamp;
pub mod views;

use crate::error::ValidationError;
use uuid::Uuid;

pub use app_data::AppData;
pub use enums::{Intent, TimeSavingPotential, DEFAULT_CATEGORIES};
pub use planning::{Goal, Vision};
pub use ranking::{display_order, notification_set};
pub use task::{Task, TaskDraft};
pub use views::Summary;

/// Fresh entity id (random v4 UUID)
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Trimmed copy of a required text field
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_is_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  x ").unwrap(), "x");
        assert_eq!(require_text("name", "\n\t").unwrap_err(), ValidationError::EmptyField("name"));
    }
}
