mod request;
mod validation;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub use request::{CreateTaskRequest, Pagination, Patch, UpdateTaskRequest};
pub use validation::{parse_json_body, FieldError, ValidationErrors};

/// A persisted task, also used as the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub type TaskResponse = Task;

impl Task {
    /// Merge `changes` into this task and stamp `updated_at`.
    ///
    /// Unset keys keep their current value. The new `updated_at` is always
    /// strictly later than `created_at` and any previous `updated_at`.
    pub fn apply(&mut self, changes: &UpdateTaskRequest, at: DateTime<Utc>) {
        if let Patch::Set(title) = &changes.title {
            self.title = title.clone();
        }
        match &changes.description {
            Patch::Set(description) => self.description = Some(description.clone()),
            Patch::Null => self.description = None,
            Patch::Unset => {}
        }
        if let Patch::Set(completed) = changes.completed {
            self.completed = completed;
        }

        let floor = self.updated_at.unwrap_or(self.created_at);
        self.updated_at = Some(if at > floor {
            at
        } else {
            floor + Duration::microseconds(1)
        });
    }
}
