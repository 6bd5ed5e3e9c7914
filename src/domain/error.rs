use thiserror::Error;

use super::todo::TodoId;

#[derive(Debug, Error)]
pub enum TodoError {
    /// Malformed input: title, limit, sort field, boolean flags.
    #[error("{0}")]
    Validation(String),
    /// Structurally wrong identifier.
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Todo with ID {0} not found")]
    NotFound(TodoId),
    /// The repository itself failed.
    #[error("backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

impl TodoError {
    pub fn is_client_error(&self) -> bool { !matches!(self, Self::Backend(_)) }
}

pub type TodoResult<T> = Result<T, TodoError>;
