use thiserror::Error;

/// Errors produced while compiling a filter string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Entity '{0}' not found")]
    EntityNotFound(String),

    #[error("{0}")]
    InvalidFilter(String),
}

impl FilterError {
    pub fn invalid(message: impl Into<String>) -> Self {
        FilterError::InvalidFilter(message.into())
    }

    pub fn is_entity_not_found(&self) -> bool {
        matches!(self, FilterError::EntityNotFound(_))
    }
}
