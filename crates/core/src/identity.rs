// Caller identity and capability checks
//
// The HTTP layer authenticates a request and hands services an Identity.
// Admin-gated operations call require_admin before touching the store.

use uuid::Uuid;

use crate::error::{EventError, Result};

/// Authenticated caller as seen by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Identity {
    pub fn user(id: Uuid) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    pub fn admin(id: Uuid) -> Self {
        Self { id, is_admin: true }
    }

    /// True if this identity may act on resources owned by `owner`
    pub fn can_act_for(&self, owner: Uuid) -> bool {
        self.is_admin || self.id == owner
    }
}

/// Capability check for admin-only operations
pub fn require_admin(identity: &Identity) -> Result<()> {
    if identity.is_admin {
        Ok(())
    } else {
        Err(EventError::Forbidden("Access denied. Admin only.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&Identity::admin(Uuid::now_v7())).is_ok());

        let err = require_admin(&Identity::user(Uuid::now_v7())).unwrap_err();
        assert!(matches!(err, EventError::Forbidden(_)));
    }

    #[test]
    fn test_can_act_for() {
        let owner = Uuid::now_v7();
        let other = Uuid::now_v7();

        assert!(Identity::user(owner).can_act_for(owner));
        assert!(!Identity::user(other).can_act_for(owner));
        assert!(Identity::admin(other).can_act_for(owner));
    }
}
