use crate::model::ValidationErrors;

pub const PIZZA_NOT_FOUND: &str = "No pizza found with this id!";
pub const COMMENT_NOT_FOUND: &str = "No comment with this id!";

/// Failure of a pizza or comment operation. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AccessError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::NotFound(_))
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
