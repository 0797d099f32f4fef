/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Lifecycle state carried by every entity. Independent from soft deletion:
/// an INACTIVE record is still visible, a soft-deleted one is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordState {
    Active,
    Inactive,
}

impl RecordState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::Active => "ACTIVE",
            RecordState::Inactive => "INACTIVE",
        }
    }
}

/// Alert severity, ordered so that `Critical` compares highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "LOW",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
            AlertLevel::Critical => "CRITICAL",
        }
    }
}

/// User roles within an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Operator,
    Viewer,
    Manager,
}

/// Entity kinds the admin surface exposes. Parsed from the `:entity` path
/// segment the same way schema names key the data routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    Category,
    Zone,
    Device,
    Measurement,
    Alert,
    UserProfile,
}

impl EntityKind {
    /// Parse the plural path segment used by the admin routes
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "organizations" => Some(EntityKind::Organization),
            "categories" => Some(EntityKind::Category),
            "zones" => Some(EntityKind::Zone),
            "devices" => Some(EntityKind::Device),
            "measurements" => Some(EntityKind::Measurement),
            "alerts" => Some(EntityKind::Alert),
            "user_profiles" => Some(EntityKind::UserProfile),
            _ => None,
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Organization => "organizations",
            EntityKind::Category => "categories",
            EntityKind::Zone => "zones",
            EntityKind::Device => "devices",
            EntityKind::Measurement => "measurements",
            EntityKind::Alert => "alerts",
            EntityKind::UserProfile => "user_profiles",
        }
    }

    /// Canonical ordering column applied when the caller supplies none
    pub fn default_order(&self) -> (&'static str, bool) {
        match self {
            EntityKind::Measurement | EntityKind::Alert => ("date", false),
            EntityKind::UserProfile => ("user_id", true),
            _ => ("name", true),
        }
    }
}
