//! Completion lookup used by bid placement.

use coursebid_types::{CourseCode, Identity};

/// Answers whether a claimant has completed a course.
pub trait PrerequisiteOracle {
    fn has_completed(&self, claimant: &Identity, course: &CourseCode) -> bool;
}

impl<F> PrerequisiteOracle for F
where
    F: Fn(&Identity, &CourseCode) -> bool,
{
    fn has_completed(&self, claimant: &Identity, course: &CourseCode) -> bool {
        self(claimant, course)
    }
}

/// Oracle for catalogs without prerequisites. Nothing is ever completed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompletions;

impl PrerequisiteOracle for NoCompletions {
    fn has_completed(&self, _claimant: &Identity, _course: &CourseCode) -> bool {
        false
    }
}
