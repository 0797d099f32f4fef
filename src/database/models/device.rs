use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::RecordState;

use super::{check_name, ValidationError};

pub const MAX_USAGE_MIN: i32 = 1;
pub const MAX_USAGE_MAX: i32 = 10_000;

/// A monitored device. (name, organization_id) is unique; the organization
/// reference is what the DIRECT scoping strategy filters on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub zone_id: Uuid,
    pub organization_id: Uuid,
    /// Maximum expected consumption in watts
    pub max_usage: i32,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Device {
    pub fn validate(name: &str, max_usage: i32) -> Result<(), ValidationError> {
        check_name("name", name)?;
        if !(MAX_USAGE_MIN..=MAX_USAGE_MAX).contains(&max_usage) {
            return Err(ValidationError::new(
                "max_usage",
                format!("must be between {} and {}", MAX_USAGE_MIN, MAX_USAGE_MAX),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.organization_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn device(name: &str) -> Device {
        Device {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category_id: Uuid::new_v4(),
            zone_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            max_usage: 100,
            state: RecordState::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn label_carries_name_and_owner() {
        let d = device("meter-1");
        assert_eq!(d.to_string(), format!("meter-1 ({})", d.organization_id));
    }

    #[test]
    fn max_usage_bounds() {
        assert!(Device::validate("meter-1", 1).is_ok());
        assert!(Device::validate("meter-1", 10_000).is_ok());
        assert!(Device::validate("meter-1", 0).is_err());
        assert!(Device::validate("meter-1", 10_001).is_err());
    }
}
