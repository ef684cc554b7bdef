//! Request actor context.
//!
//! Authentication lives outside the core; callers hand actions a resolved
//! `Actor` and the lifecycle enforces per-transition permissions from it.

use super::entity_ids::UserId;
use super::errors::CoreError;

/// The authenticated principal performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    /// A regular (non-admin) user.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// An administrator.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Require this actor to be a specific user (e.g. the listing's donor).
    pub fn require_user(&self, expected: UserId, role: &'static str) -> Result<(), CoreError> {
        if self.user_id == expected {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(role))
        }
    }

    /// Require this actor to be a specific user or an administrator.
    pub fn require_user_or_admin(
        &self,
        expected: UserId,
        role: &'static str,
    ) -> Result<(), CoreError> {
        if self.is_admin || self.user_id == expected {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(role))
        }
    }
}
