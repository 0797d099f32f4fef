pub mod actions;
pub mod entities;

pub use actions::actions_post;
pub use entities::{entity_detail, entity_list};

use crate::error::ApiError;
use crate::types::EntityKind;

/// Resolve the `:entity` path segment; unknown segments are a plain 404
pub(crate) fn resolve_entity(segment: &str) -> Result<EntityKind, ApiError> {
    EntityKind::from_path(segment)
        .ok_or_else(|| ApiError::not_found(format!("Unknown entity: {}", segment)))
}
