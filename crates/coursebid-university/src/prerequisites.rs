//! Course completion records.

use std::collections::{BTreeSet, HashMap};

use coursebid_auction::PrerequisiteOracle;
use coursebid_types::{CourseCode, Identity};

/// Which students have completed which courses.
#[derive(Debug, Default)]
pub struct CompletionRegistry {
    completed: HashMap<Identity, BTreeSet<CourseCode>>,
}

impl CompletionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completion. Returns `false` if it was already recorded.
    pub fn mark_completed(&mut self, student: Identity, course: CourseCode) -> bool {
        self.completed.entry(student).or_default().insert(course)
    }

    /// Completed courses of a student, in code order.
    #[must_use]
    pub fn completed_by(&self, student: &Identity) -> Vec<CourseCode> {
        self.completed
            .get(student)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl PrerequisiteOracle for CompletionRegistry {
    fn has_completed(&self, claimant: &Identity, course: &CourseCode) -> bool {
        self.completed
            .get(claimant)
            .is_some_and(|c| c.contains(course))
    }
}
