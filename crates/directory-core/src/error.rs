//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Menu not found for location: {0}")]
    MenuNotFound(String),

    #[error("Menu not found: {0}")]
    MenuNotFoundById(Uuid),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(Uuid),

    #[error("Menu location already exists: {0}")]
    MenuLocationAlreadyExists(String),

    #[error("Invalid parent {parent_id}: {reason}")]
    InvalidParent { parent_id: Uuid, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
