pub mod alert;
pub mod device;
pub mod measurement;
pub mod organization;
pub mod taxonomy;
pub mod user_profile;

use thiserror::Error;

/// Field-level constraint violation, rejected before anything is persisted
#[derive(Debug, Error, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

pub(crate) fn check_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if value.len() > 100 {
        return Err(ValidationError::new(field, "must be at most 100 characters"));
    }
    Ok(())
}
