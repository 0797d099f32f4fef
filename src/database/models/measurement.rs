use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::RecordState;

use super::ValidationError;

pub const USAGE_MIN: f64 = 0.0;
pub const USAGE_MAX: f64 = 10_000.0;

/// A usage reading emitted by a device. `date` is the event timestamp, set
/// once at creation. Scoped INDIRECTly through the parent device.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Measurement {
    pub id: Uuid,
    pub device_id: Uuid,
    /// Consumption in KWh
    pub usage: f64,
    pub date: DateTime<Utc>,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Measurement {
    pub fn validate(usage: f64) -> Result<(), ValidationError> {
        if !usage.is_finite() || usage < USAGE_MIN {
            return Err(ValidationError::new("usage", "must not be negative"));
        }
        if usage > USAGE_MAX {
            return Err(ValidationError::new("usage", format!("must not exceed {} KWh", USAGE_MAX)));
        }
        Ok(())
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} KWh on {}", self.usage, self.date.format("%Y-%m-%d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_shows_usage_and_event_time() {
        let m = Measurement {
            id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            usage: 42.5,
            date: "2026-03-01T08:30:00Z".parse().unwrap(),
            state: RecordState::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        assert_eq!(m.to_string(), "42.5 KWh on 2026-03-01 08:30");
    }

    #[test]
    fn usage_bounds() {
        assert!(Measurement::validate(0.0).is_ok());
        assert!(Measurement::validate(10_000.0).is_ok());
        assert!(Measurement::validate(-0.1).is_err());
        assert!(Measurement::validate(10_000.1).is_err());
        assert!(Measurement::validate(f64::NAN).is_err());
    }
}
