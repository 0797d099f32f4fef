use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::RecordState;

use super::{check_name, ValidationError};

/// Tenancy root: every device belongs to exactly one organization
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Organization {
    pub fn validate(name: &str, email: &str) -> Result<(), ValidationError> {
        check_name("name", name)?;
        if email.len() > 100 {
            return Err(ValidationError::new("email", "must be at most 100 characters"));
        }
        // Minimal shape check; uniqueness is enforced by the store
        let valid = email.split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !valid {
            return Err(ValidationError::new("email", format!("invalid email address: {}", email)));
        }
        Ok(())
    }
}

impl std::fmt::Display for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_email_shape() {
        assert!(Organization::validate("Acme", "ops@acme.io").is_ok());
        assert!(Organization::validate("Acme", "not-an-email").is_err());
        assert!(Organization::validate("Acme", "@acme.io").is_err());
        assert!(Organization::validate("", "ops@acme.io").is_err());
    }
}
