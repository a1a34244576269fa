//! Round-close settlement.
//!
//! ```text
//! plan_settlement(&catalog)        -> SettlementReport   (pure)
//! apply_settlement(&mut catalog, &report)               (commit)
//! ```
//!
//! ## Algorithm
//!
//! 1. Walk courses in ascending code order
//! 2. Walk each course's bid list in priority order
//! 3. While seats remain, accept the bid: record an award for its amount
//!    and drop every other pending bid of that claimant
//! 4. Once the course is full, the remaining bids are rejected
//! 5. Hash the awards into the award root
//!
//! Dropping a winner's other bids is modelled by skipping them when the
//! walk reaches their course. Courses already walked hold no live bids,
//! so the outcome matches removing them at acceptance time.
//!
//! Splitting plan from commit lets the caller check every burn against the
//! ledger before anything changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use coursebid_types::{
    Award, AwardId, CourseCode, CourseSettlement, DiscardedBid, Identity, Rejection, RoundId,
    SettlementReport,
};

use crate::catalog::ResourceCatalog;
use crate::determinism::compute_award_root;

/// Decide awards, rejections and discards without touching the catalog.
#[must_use]
pub fn plan_settlement(
    catalog: &ResourceCatalog,
    round_id: RoundId,
    settled_at: DateTime<Utc>,
) -> SettlementReport {
    let mut awards = Vec::new();
    let mut rejections = Vec::new();
    let mut discarded = Vec::new();
    let mut courses = Vec::with_capacity(catalog.courses.len());
    // Claimant -> course they won in this walk.
    let mut winners: HashMap<Identity, CourseCode> = HashMap::new();

    for (code, record) in &catalog.courses {
        let quota = record.course.quota;
        let accepted_before = u32::try_from(record.accepted.len()).unwrap_or(u32::MAX);
        let mut remaining = record.seats_remaining();
        let mut accepted = 0u32;
        let mut rejected = 0u32;

        for entry in record.bids.entries() {
            if let Some(won) = winners.get(&entry.claimant) {
                discarded.push(DiscardedBid {
                    course: code.clone(),
                    claimant: entry.claimant,
                    amount: entry.amount,
                    awarded_in: won.clone(),
                });
                continue;
            }
            if remaining > 0 {
                remaining -= 1;
                accepted += 1;
                awards.push(Award {
                    id: AwardId::deterministic(round_id, code, &entry.claimant),
                    round_id,
                    course: code.clone(),
                    claimant: entry.claimant,
                    amount: entry.amount,
                    weight: record.course.weight,
                });
                winners.insert(entry.claimant, code.clone());
            } else {
                rejected += 1;
                rejections.push(Rejection {
                    course: code.clone(),
                    claimant: entry.claimant,
                    amount: entry.amount,
                });
            }
        }

        if accepted > 0 || rejected > 0 {
            tracing::debug!(
                course = %code,
                quota,
                accepted_before,
                accepted,
                rejected,
                "course settled"
            );
        }
        courses.push(CourseSettlement {
            course: code.clone(),
            quota,
            accepted_before,
            accepted,
            rejected,
        });
    }

    let award_root = compute_award_root(&awards);
    SettlementReport {
        round_id,
        settled_at,
        awards,
        rejections,
        discarded,
        courses,
        award_root,
    }
}

/// Commit a report produced by [`plan_settlement`] on this same catalog.
///
/// Appends every award to its course's accepted set, then clears all bid
/// lists and reservations.
pub fn apply_settlement(catalog: &mut ResourceCatalog, report: &SettlementReport) {
    for award in &report.awards {
        if let Some(record) = catalog.courses.get_mut(&award.course) {
            record.accepted.push(award.claimant);
            debug_assert!(record.accepted.len() <= record.course.quota as usize);
        }
        catalog
            .awards
            .entry(award.claimant)
            .or_default()
            .insert(award.course.clone());
    }
    for record in catalog.courses.values_mut() {
        record.bids.drain();
    }
    catalog.reservations.clear();

    tracing::info!(
        round = %report.round_id,
        awards = report.awards.len(),
        rejections = report.rejections.len(),
        discarded = report.discarded.len(),
        burned = %report.burned_total(),
        award_root = %report.award_root_hex(),
        "settlement applied"
    );
}

/// Plan and apply in one step.
pub fn settle_round(
    catalog: &mut ResourceCatalog,
    round_id: RoundId,
    settled_at: DateTime<Utc>,
) -> SettlementReport {
    let report = plan_settlement(catalog, round_id, settled_at);
    apply_settlement(catalog, &report);
    report
}
