//! Settlement output types.
//!
//! Settlement never touches the ledger itself. It returns a
//! [`SettlementReport`] and the orchestrator applies the burns it lists.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AwardId, CourseCode, Identity, RoundId};

/// A seat granted at round close. Its `amount` is burned from the claimant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub id: AwardId,
    pub round_id: RoundId,
    pub course: CourseCode,
    pub claimant: Identity,
    /// Credits burned for the seat.
    pub amount: u64,
    /// Course weight committed against the claimant's budget ceiling.
    pub weight: u32,
}

/// A bid that reached settlement but found the course full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub course: CourseCode,
    pub claimant: Identity,
    pub amount: u64,
}

/// A pending bid dropped because its claimant won a seat elsewhere first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardedBid {
    pub course: CourseCode,
    pub claimant: Identity,
    pub amount: u64,
    /// The course whose award caused the discard.
    pub awarded_in: CourseCode,
}

/// Per-course summary of one settlement walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSettlement {
    pub course: CourseCode,
    pub quota: u32,
    /// Seats already taken when the walk started.
    pub accepted_before: u32,
    /// Seats granted in this walk.
    pub accepted: u32,
    pub rejected: u32,
}

/// Everything one round close decided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    pub round_id: RoundId,
    pub settled_at: DateTime<Utc>,
    /// Awards in settlement order (course code ascending, then list order).
    pub awards: Vec<Award>,
    pub rejections: Vec<Rejection>,
    pub discarded: Vec<DiscardedBid>,
    pub courses: Vec<CourseSettlement>,
    /// SHA-256 root over `awards` for cross-replica comparison.
    pub award_root: [u8; 32],
}

impl SettlementReport {
    /// Total credits burned by this settlement.
    #[must_use]
    pub fn burned_total(&self) -> u128 {
        self.awards.iter().map(|a| u128::from(a.amount)).sum()
    }

    /// Credits to burn per claimant.
    #[must_use]
    pub fn burns_by_claimant(&self) -> BTreeMap<Identity, u128> {
        let mut burns = BTreeMap::new();
        for award in &self.awards {
            *burns.entry(award.claimant).or_insert(0) += u128::from(award.amount);
        }
        burns
    }

    /// Awards granted to one claimant in this round.
    pub fn awards_for<'a>(&'a self, claimant: &'a Identity) -> impl Iterator<Item = &'a Award> + 'a {
        self.awards.iter().filter(move |a| a.claimant == *claimant)
    }

    #[must_use]
    pub fn award_root_hex(&self) -> String {
        hex::encode(self.award_root)
    }
}
