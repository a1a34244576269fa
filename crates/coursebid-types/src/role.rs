//! Participant roles.

use serde::{Deserialize, Serialize};

/// The role an identity holds in one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Not registered.
    #[default]
    Unknown,
    /// Enrolled claimant; may buy credits, bid and transfer.
    Student,
    /// Creates courses, runs rounds, appoints lecturers, signs enrollments.
    Admin,
    /// Owns courses and records prerequisite completions for them.
    Lecturer,
    /// Root authority; appoints and revokes admins.
    Chief,
}

impl Role {
    /// Whether this role may perform actions that require `required`.
    ///
    /// The chief may act as an admin; no other substitution exists.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self == required || (self == Self::Chief && required == Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Student => write!(f, "STUDENT"),
            Self::Admin => write!(f, "ADMIN"),
            Self::Lecturer => write!(f, "LECTURER"),
            Self::Chief => write!(f, "CHIEF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chief_acts_as_admin() {
        assert!(Role::Chief.satisfies(Role::Admin));
        assert!(Role::Chief.satisfies(Role::Chief));
        assert!(!Role::Admin.satisfies(Role::Chief));
        assert!(!Role::Lecturer.satisfies(Role::Admin));
        assert!(!Role::Unknown.satisfies(Role::Student));
    }

    #[test]
    fn default_is_unknown() {
        assert_eq!(Role::default(), Role::Unknown);
        assert_eq!(format!("{}", Role::Lecturer), "LECTURER");
    }
}
