use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::TodoError;

pub const TITLE_MIN_LEN: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl TodoId {
    /// Ids are assigned from 1 upwards, so anything else can never match a record.
    pub fn ensure_valid(self) -> Result<Self, TodoError> {
        if self.0 <= 0 {
            return Err(TodoError::InvalidArgument("ID must be a positive number".into()));
        }
        Ok(self)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record that has not been given an id yet. The repository assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTodo {
    pub fn with_id(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            is_completed: self.is_completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), is_completed: None }
    }

    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }

    /// Validates the input and stamps both timestamps with `now`.
    pub fn into_new_todo(self, now: DateTime<Utc>) -> Result<NewTodo, TodoError> {
        let title = self
            .title
            .ok_or_else(|| TodoError::Validation("title should not be empty".into()))?;
        validate_title(&title)?;
        Ok(NewTodo {
            title,
            is_completed: self.is_completed.unwrap_or(false),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Sparse set of field overrides for a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl UpdateTodo {
    pub fn validate(&self) -> Result<(), TodoError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

pub fn validate_title(title: &str) -> Result<(), TodoError> {
    if title.is_empty() {
        return Err(TodoError::Validation("title should not be empty".into()));
    }
    if title.chars().count() < TITLE_MIN_LEN {
        return Err(TodoError::Validation(format!(
            "title must be longer than or equal to {TITLE_MIN_LEN} characters"
        )));
    }
    Ok(())
}

/// Applies only the fields present in `patch` and stamps a fresh `updated_at`.
///
/// `updated_at` always moves forward: when `now` is not past the prior stamp
/// (coarse clock, skew) the prior stamp plus one microsecond is used instead.
pub fn merge(existing: Todo, patch: UpdateTodo, now: DateTime<Utc>) -> Todo {
    let floor = existing.updated_at + Duration::microseconds(1);
    Todo {
        id: existing.id,
        title: patch.title.unwrap_or(existing.title),
        is_completed: patch.is_completed.unwrap_or(existing.is_completed),
        created_at: existing.created_at,
        updated_at: if now >= floor { now } else { floor },
    }
}
