//! Domain errors

use sitenav_shared::EntityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Menu not found: {0}")]
    MenuNotFound(EntityId),

    #[error("Parent menu not found: {0}")]
    ParentNotFound(EntityId),

    #[error("Menu {menu_id} cannot move under {parent_id}: cycle detected")]
    CycleDetected {
        menu_id: EntityId,
        parent_id: EntityId,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Update rejected by server: {0}")]
    ValidationRejected(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence failed: {failed} of {total} updates did not land")]
    PersistenceFailed { failed: usize, total: usize },

    #[error("Internal error: {0}")]
    InternalError(String),
}
