//! Award root: a SHA-256 digest over a settlement's awards.
//!
//! Two replicas that settle the same round from the same state produce the
//! same awards in the same order, and therefore the same root.

use coursebid_types::Award;
use coursebid_types::constants::AWARD_ROOT_DOMAIN;
use sha2::{Digest, Sha256};

/// Compute the award root over awards in settlement order.
#[must_use]
pub fn compute_award_root(awards: &[Award]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(AWARD_ROOT_DOMAIN);
    hasher.update((awards.len() as u64).to_le_bytes());

    for award in awards {
        hasher.update(award.id.0.as_bytes());
        hasher.update(award.round_id.0.to_le_bytes());
        hasher.update((award.course.as_str().len() as u64).to_le_bytes());
        hasher.update(award.course.as_str().as_bytes());
        hasher.update(award.claimant.as_bytes());
        hasher.update(award.amount.to_le_bytes());
        hasher.update(award.weight.to_le_bytes());
    }

    hasher.finalize().into()
}

/// Recompute and compare.
#[must_use]
pub fn verify_award_root(awards: &[Award], expected_root: &[u8; 32]) -> bool {
    compute_award_root(awards) == *expected_root
}
