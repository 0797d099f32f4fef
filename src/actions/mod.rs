pub mod executor;

pub use executor::BulkActionExecutor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::types::EntityKind;

/// Hard precondition on usage report selections. Requests over the cap are
/// rejected outright, never truncated.
pub const USAGE_REPORT_MAX_SELECTION: usize = 10;

/// Admin bulk actions, keyed by the entity kind they apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    MarkAsActive,
    MarkAsInactive,
    MarkAsResolved,
    MarkAsUnresolved,
    GenerateUsageReport,
    ExportMeasurements,
}

impl BulkAction {
    /// Resolve an action name against an entity kind. Names are only valid
    /// for the kind that defines them.
    pub fn resolve(kind: EntityKind, name: &str) -> Option<Self> {
        match (kind, name) {
            (EntityKind::Device, "mark_as_active") => Some(BulkAction::MarkAsActive),
            (EntityKind::Device, "mark_as_inactive") => Some(BulkAction::MarkAsInactive),
            (EntityKind::Device, "generate_usage_report") => Some(BulkAction::GenerateUsageReport),
            (EntityKind::Alert, "mark_as_resolved") => Some(BulkAction::MarkAsResolved),
            (EntityKind::Alert, "mark_as_unresolved") => Some(BulkAction::MarkAsUnresolved),
            (EntityKind::Measurement, "export_measurements") => Some(BulkAction::ExportMeasurements),
            _ => None,
        }
    }

    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            BulkAction::MarkAsActive
                | BulkAction::MarkAsInactive
                | BulkAction::MarkAsResolved
                | BulkAction::MarkAsUnresolved
        )
    }

    /// Pure selection-size precondition, checked before any gate runs. Over
    /// the usage-report cap nothing executes; the caller gets a warning to
    /// narrow the selection and retry.
    pub fn precondition(&self, selection: usize) -> Option<ActionOutcome> {
        match self {
            BulkAction::GenerateUsageReport if selection > USAGE_REPORT_MAX_SELECTION => {
                Some(ActionOutcome::warning(format!(
                    "Usage reports can cover at most {} devices.",
                    USAGE_REPORT_MAX_SELECTION
                )))
            }
            _ => None,
        }
    }

    /// The state transition behind a mutating action. `updated_at` always
    /// moves with the mutation; the entity columns are fixed per action, so
    /// the statement stays a single atomic UPDATE.
    pub fn mutation(&self) -> Option<Mutation> {
        match self {
            BulkAction::MarkAsActive => Some(Mutation {
                set_clause: "state = 'ACTIVE', updated_at = NOW()",
                past_tense: "devices marked as active",
            }),
            BulkAction::MarkAsInactive => Some(Mutation {
                set_clause: "state = 'INACTIVE', updated_at = NOW()",
                past_tense: "devices marked as inactive",
            }),
            BulkAction::MarkAsResolved => Some(Mutation {
                set_clause: "is_resolved = TRUE, updated_at = NOW()",
                past_tense: "alerts marked as resolved",
            }),
            BulkAction::MarkAsUnresolved => Some(Mutation {
                set_clause: "is_resolved = FALSE, updated_at = NOW()",
                past_tense: "alerts marked as unresolved",
            }),
            BulkAction::GenerateUsageReport | BulkAction::ExportMeasurements => None,
        }
    }
}

/// SET clause and reporting text for one mutating action
#[derive(Debug, Clone, Copy)]
pub struct Mutation {
    pub set_clause: &'static str,
    pub past_tense: &'static str,
}

/// Severity of an action outcome message, surfaced to the operator by the
/// admin layer. WARNING means the action was halted without effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub message: String,
    pub level: MessageLevel,
    /// Records actually touched; zero for read-only or halted actions
    pub affected: u64,
}

impl ActionOutcome {
    pub fn info(message: impl Into<String>, affected: u64) -> Self {
        Self { message: message.into(), level: MessageLevel::Info, affected }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: MessageLevel::Warning, affected: 0 }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    /// A requested record lies outside the principal's visible scope. The
    /// admin layer must present this as not-found, never as forbidden.
    #[error("one or more records are not accessible")]
    ScopeViolation,

    #[error("action not permitted: {0}")]
    ActionDenied(String),

    #[error("unknown action '{name}' for {kind:?}")]
    UnknownAction { kind: EntityKind, name: String },

    #[error("no records selected")]
    EmptySelection,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("export failed: {0}")]
    Export(String),
}

impl From<sqlx::Error> for ActionError {
    fn from(err: sqlx::Error) -> Self {
        ActionError::Database(DatabaseError::Sqlx(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_resolve_only_for_their_kind() {
        assert_eq!(
            BulkAction::resolve(EntityKind::Device, "mark_as_active"),
            Some(BulkAction::MarkAsActive)
        );
        assert_eq!(BulkAction::resolve(EntityKind::Alert, "mark_as_active"), None);
        assert_eq!(
            BulkAction::resolve(EntityKind::Alert, "mark_as_resolved"),
            Some(BulkAction::MarkAsResolved)
        );
        assert_eq!(BulkAction::resolve(EntityKind::Device, "mark_as_resolved"), None);
        assert_eq!(BulkAction::resolve(EntityKind::Measurement, "generate_usage_report"), None);
        assert_eq!(BulkAction::resolve(EntityKind::Organization, "mark_as_active"), None);
    }

    #[test]
    fn read_only_actions_have_no_mutation() {
        assert!(BulkAction::GenerateUsageReport.mutation().is_none());
        assert!(BulkAction::ExportMeasurements.mutation().is_none());
        assert!(!BulkAction::GenerateUsageReport.is_mutating());
        assert!(!BulkAction::ExportMeasurements.is_mutating());
    }

    #[test]
    fn mutations_always_touch_updated_at() {
        for action in [
            BulkAction::MarkAsActive,
            BulkAction::MarkAsInactive,
            BulkAction::MarkAsResolved,
            BulkAction::MarkAsUnresolved,
        ] {
            let mutation = action.mutation().unwrap();
            assert!(mutation.set_clause.contains("updated_at = NOW()"));
            assert!(action.is_mutating());
        }
    }
}
