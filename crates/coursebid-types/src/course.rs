//! Course (resource) descriptors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{CourseCode, Identity};

/// Static description of an allocatable course.
///
/// The acceptance state and bid list live in the catalog; this is only the
/// immutable part registered by `create_course`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code.
    pub code: CourseCode,
    /// Number of seats.
    pub quota: u32,
    /// Load units consumed against a claimant's ceiling.
    pub weight: u32,
    /// Lecturer who owns the course.
    pub owner: Identity,
    /// Courses a claimant must have completed before bidding.
    pub prerequisites: BTreeSet<CourseCode>,
}

impl Course {
    #[must_use]
    pub fn new(code: CourseCode, quota: u32, weight: u32, owner: Identity) -> Self {
        Self {
            code,
            quota,
            weight,
            owner,
            prerequisites: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_prerequisites(mut self, prerequisites: impl IntoIterator<Item = CourseCode>) -> Self {
        self.prerequisites.extend(prerequisites);
        self
    }

    #[must_use]
    pub fn has_prerequisites(&self) -> bool {
        !self.prerequisites.is_empty()
    }
}
