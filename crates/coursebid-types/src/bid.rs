//! Bid types.

use serde::{Deserialize, Serialize};

use crate::{CourseCode, Identity};

/// One position in a course's priority bid list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidEntry {
    pub claimant: Identity,
    /// Credits reserved by this bid.
    pub amount: u64,
    /// Insertion sequence; lower ranks win ties.
    pub rank: u64,
}

/// A live bid as seen from outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub course: CourseCode,
    pub claimant: Identity,
    pub amount: u64,
    pub rank: u64,
}

impl Bid {
    #[must_use]
    pub fn from_entry(course: CourseCode, entry: BidEntry) -> Self {
        Self {
            course,
            claimant: entry.claimant,
            amount: entry.amount,
            rank: entry.rank,
        }
    }
}
