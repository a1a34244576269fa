//! Role registry.
//!
//! ```text
//! CHIEF ──appoints/revokes──▶ ADMIN ──appoints──▶ LECTURER
//!                               │
//!                               └──signs enrollment──▶ STUDENT
//! ```
//!
//! An identity holds at most one role. The chief is fixed at construction.

use std::collections::HashMap;

use coursebid_types::{CoursebidError, Identity, Result, Role};

/// Answers which role an identity holds.
pub trait RoleOracle {
    fn role_of(&self, identity: &Identity) -> Role;

    /// Fail unless `caller` holds (or may act as) `required`.
    fn require(&self, caller: &Identity, required: Role) -> Result<()> {
        let actual = self.role_of(caller);
        if actual.satisfies(required) {
            Ok(())
        } else {
            Err(CoursebidError::AuthorizationError {
                caller: *caller,
                required,
                actual,
            })
        }
    }
}

/// In-memory role assignments.
#[derive(Debug)]
pub struct RoleRegistry {
    chief: Identity,
    roles: HashMap<Identity, Role>,
}

impl RoleRegistry {
    #[must_use]
    pub fn new(chief: Identity) -> Self {
        let mut roles = HashMap::new();
        roles.insert(chief, Role::Chief);
        Self { chief, roles }
    }

    #[must_use]
    pub fn chief(&self) -> Identity {
        self.chief
    }

    /// Chief grants the admin role.
    pub fn appoint_admin(&mut self, caller: &Identity, who: Identity) -> Result<()> {
        self.require(caller, Role::Chief)?;
        self.grant(who, Role::Admin)
    }

    /// Chief withdraws the admin role. Returns `false` if `who` was not an
    /// admin.
    pub fn revoke_admin(&mut self, caller: &Identity, who: &Identity) -> Result<bool> {
        self.require(caller, Role::Chief)?;
        if self.role_of(who) != Role::Admin {
            return Ok(false);
        }
        self.roles.remove(who);
        tracing::info!(identity = %who, "admin revoked");
        Ok(true)
    }

    /// Admin (or chief) grants the lecturer role.
    pub fn appoint_lecturer(&mut self, caller: &Identity, who: Identity) -> Result<()> {
        self.require(caller, Role::Admin)?;
        self.grant(who, Role::Lecturer)
    }

    /// Register an enrolled student. Authorization happens upstream.
    pub fn register_student(&mut self, who: Identity) -> Result<()> {
        if self.role_of(&who) == Role::Student {
            return Err(CoursebidError::AlreadyEnrolled(who));
        }
        self.grant(who, Role::Student)
    }

    /// Number of identities holding `role`.
    #[must_use]
    pub fn count(&self, role: Role) -> usize {
        self.roles.values().filter(|r| **r == role).count()
    }

    fn grant(&mut self, who: Identity, role: Role) -> Result<()> {
        let existing = self.role_of(&who);
        if existing != Role::Unknown {
            return Err(CoursebidError::RoleConflict {
                identity: who,
                existing,
            });
        }
        self.roles.insert(who, role);
        tracing::info!(identity = %who, %role, "role granted");
        Ok(())
    }
}

impl RoleOracle for RoleRegistry {
    fn role_of(&self, identity: &Identity) -> Role {
        self.roles.get(identity).copied().unwrap_or_default()
    }
}
