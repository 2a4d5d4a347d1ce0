pub mod auth_services;
pub mod keluhan_services;
pub mod password;
pub mod photo_services;
pub mod session_store;
pub mod user_services;
pub mod validation;

use crate::errors::ServiceError;
use crate::models::session::{Capability, Session};

/// Server-side role check run by every mutating workflow.
pub fn require_capability(actor: &Session, capability: Capability) -> Result<(), ServiceError> {
    if actor.can(capability) {
        Ok(())
    } else {
        log::warn!(
            "Profile {} ({}) tried to {}",
            actor.profile.id,
            actor.role(),
            capability.describe()
        );
        Err(ServiceError::Forbidden(capability.describe()))
    }
}
