//! Task, tag and topic records.
//!
//! These mirror the rows of the SQLite store. A `Task` with `id == 0` has not
//! been persisted yet; only the store hands out IDs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single to-do item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub should_notify: bool,
    pub topic_id: Option<i64>,
    pub is_done: bool,
}

impl Task {
    /// Build an unsaved task from the two fields the entry form collects.
    pub fn draft(name: &str, description: &str) -> Self {
        Task {
            name: name.to_string(),
            description: description.to_string(),
            ..Task::default()
        }
    }

    /// Whether the store has assigned this task an ID.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Copy of this task with `is_done` flipped.
    pub fn toggled(&self) -> Self {
        Task {
            is_done: !self.is_done,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_is_not_persisted() {
        let task = Task::draft("Buy milk", "2%");
        assert_eq!(task.id, 0);
        assert!(!task.is_persisted());
        assert!(!task.is_done);
        assert_eq!(task.description, "2%");
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let task = Task { id: 3, ..Task::draft("Write report", "") };
        let twice = task.toggled().toggled();
        assert_eq!(task, twice);
        assert!(task.toggled().is_done);
    }
}
