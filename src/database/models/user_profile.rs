use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{RecordState, Role};

use super::ValidationError;

/// Per-user profile linking an auth identity to an organization and a role.
/// A profile without an organization grants no operational data access.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub role: Role,
    pub phone: Option<String>,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn validate(phone: Option<&str>) -> Result<(), ValidationError> {
        if let Some(phone) = phone {
            if phone.len() > 20 {
                return Err(ValidationError::new("phone", "must be at most 20 characters"));
            }
        }
        Ok(())
    }
}
