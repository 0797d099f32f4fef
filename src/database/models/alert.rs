use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{AlertLevel, RecordState};

use super::ValidationError;

pub const MESSAGE_MAX_LEN: usize = 200;

/// A threshold-breach alert raised against a device. `is_resolved` is
/// mutable independently of `state`; `date` is set once at creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: Uuid,
    pub device_id: Uuid,
    pub message: String,
    pub level: AlertLevel,
    pub is_resolved: bool,
    pub date: DateTime<Utc>,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn validate(message: &str) -> Result<(), ValidationError> {
        if message.trim().is_empty() {
            return Err(ValidationError::new("message", "must not be empty"));
        }
        if message.len() > MESSAGE_MAX_LEN {
            return Err(ValidationError::new(
                "message",
                format!("must be at most {} characters", MESSAGE_MAX_LEN),
            ));
        }
        Ok(())
    }

    /// Truncated message for list displays
    pub fn message_short(&self) -> String {
        match self.message.char_indices().nth(50) {
            Some((idx, _)) => format!("{}...", &self.message[..idx]),
            None => self.message.clone(),
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.level.as_str(), self.message_short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_length_bounds() {
        assert!(Alert::validate("usage above threshold").is_ok());
        assert!(Alert::validate("").is_err());
        assert!(Alert::validate(&"x".repeat(201)).is_err());
        assert!(Alert::validate(&"x".repeat(200)).is_ok());
    }

    #[test]
    fn short_message_truncates_on_char_boundaries() {
        let alert = |message: &str| Alert {
            id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            message: message.to_string(),
            level: AlertLevel::High,
            is_resolved: false,
            date: Utc::now(),
            state: RecordState::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        assert_eq!(alert("short").message_short(), "short");
        assert_eq!(alert("usage above threshold").to_string(), "HIGH: usage above threshold");
        assert_eq!(alert(&"x".repeat(60)).message_short(), format!("{}...", "x".repeat(50)));
        // multibyte content must not split a character
        assert_eq!(alert(&"é".repeat(60)).message_short(), format!("{}...", "é".repeat(50)));
    }
}
