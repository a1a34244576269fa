//! Resource catalog: every course with its bid list and accepted set.
//!
//! The catalog owns two per-claimant indexes next to the course map:
//! - **reservations**: credits held by live bids, course by course
//! - **awards**: courses a claimant has been accepted into
//!
//! A claimant's reserved total is the sum of their live bids. Bid placement
//! checks it against the ledger balance the caller passes in, so every live
//! bid stays funded without freezing anything in the ledger.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use coursebid_types::{Bid, BidEntry, Course, CourseCode, CoursebidError, Identity, Result};

use crate::bid_list::PriorityBidList;
use crate::prerequisite::PrerequisiteOracle;
use crate::round::RoundController;

/// One course in the catalog.
#[derive(Debug, Clone)]
pub struct CourseRecord {
    pub(crate) course: Course,
    pub(crate) bids: PriorityBidList,
    /// Accepted claimants in acceptance order. Append-only.
    pub(crate) accepted: Vec<Identity>,
}

impl CourseRecord {
    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn bids(&self) -> &PriorityBidList {
        &self.bids
    }

    #[must_use]
    pub fn accepted(&self) -> &[Identity] {
        &self.accepted
    }

    /// Seats still free.
    #[must_use]
    pub fn seats_remaining(&self) -> u32 {
        let taken = u32::try_from(self.accepted.len()).unwrap_or(u32::MAX);
        self.course.quota.saturating_sub(taken)
    }
}

/// Everything a bid mutation needs to know about the world outside the
/// catalog.
pub struct BidContext<'a> {
    pub round: &'a RoundController,
    pub now: DateTime<Utc>,
    /// The claimant's ledger balance.
    pub balance: u64,
    /// The claimant's budget ceiling: total credit paid in.
    pub budget_ceiling: u64,
    pub prerequisites: &'a dyn PrerequisiteOracle,
}

/// All courses, keyed and iterated in ascending code order.
#[derive(Debug, Default)]
pub struct ResourceCatalog {
    pub(crate) courses: BTreeMap<CourseCode, CourseRecord>,
    pub(crate) reservations: HashMap<Identity, BTreeMap<CourseCode, u64>>,
    pub(crate) awards: HashMap<Identity, BTreeSet<CourseCode>>,
}

impl ResourceCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Courses
    // =================================================================

    /// Add a course.
    ///
    /// # Errors
    /// - `DuplicateResource` if the code is taken
    /// - `InvalidQuota` / `InvalidWeight` for zero values
    /// - `NoSuchResource` if a prerequisite is not in the catalog
    pub fn create_course(&mut self, course: Course) -> Result<()> {
        if self.courses.contains_key(&course.code) {
            return Err(CoursebidError::DuplicateResource(course.code));
        }
        if course.quota == 0 {
            return Err(CoursebidError::InvalidQuota(0));
        }
        if course.weight == 0 {
            return Err(CoursebidError::InvalidWeight(0));
        }
        if let Some(missing) = course
            .prerequisites
            .iter()
            .find(|p| !self.courses.contains_key(*p))
        {
            return Err(CoursebidError::NoSuchResource(missing.clone()));
        }

        tracing::debug!(
            course = %course.code,
            quota = course.quota,
            weight = course.weight,
            owner = %course.owner,
            "course created"
        );
        let code = course.code.clone();
        self.courses.insert(
            code.clone(),
            CourseRecord {
                bids: PriorityBidList::new(code.clone()),
                course,
                accepted: Vec::new(),
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn course(&self, code: &CourseCode) -> Option<&Course> {
        self.courses.get(code).map(|r| &r.course)
    }

    #[must_use]
    pub fn record(&self, code: &CourseCode) -> Option<&CourseRecord> {
        self.courses.get(code)
    }

    /// Courses in ascending code order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values().map(|r| &r.course)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    // =================================================================
    // Bid mutation
    // =================================================================

    /// Place a new bid.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// course exists, round accepts bids, no live bid, not already awarded,
    /// non-zero amount, prerequisites complete, unreserved balance covers
    /// the amount, budget ceiling covers the course weight.
    pub fn place_bid(
        &mut self,
        code: &CourseCode,
        claimant: Identity,
        amount: u64,
        ctx: &BidContext<'_>,
    ) -> Result<BidEntry> {
        let record = self.record_or_err(code)?;
        ctx.round.ensure_accepting(ctx.now)?;
        if record.bids.contains(&claimant) {
            return Err(CoursebidError::DuplicateBid {
                course: code.clone(),
                claimant,
            });
        }
        if self.is_awarded(&claimant, code) {
            return Err(CoursebidError::AlreadyAwarded {
                course: code.clone(),
                claimant,
            });
        }
        if amount == 0 {
            return Err(CoursebidError::InvalidAmount(0));
        }
        if let Some(missing) = record
            .course
            .prerequisites
            .iter()
            .find(|p| !ctx.prerequisites.has_completed(&claimant, p))
        {
            return Err(CoursebidError::PrerequisiteNotMet {
                course: code.clone(),
                prerequisite: missing.clone(),
            });
        }
        let available = self.unreserved(&claimant, ctx.balance);
        if amount > available {
            return Err(CoursebidError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let needed = self.committed_weight(&claimant) + u64::from(record.course.weight);
        if needed > ctx.budget_ceiling {
            return Err(CoursebidError::BudgetExceeded {
                needed,
                ceiling: ctx.budget_ceiling,
            });
        }

        let entry = self.record_mut(code)?.bids.insert(claimant, amount)?;
        self.reservations
            .entry(claimant)
            .or_default()
            .insert(code.clone(), amount);
        tracing::debug!(course = %code, %claimant, amount, rank = entry.rank, "bid placed");
        Ok(entry)
    }

    /// Change the amount of a live bid. Returns the re-sorted entry.
    ///
    /// # Errors
    /// `NoSuchResource`, `RoundClosed`, `NoSuchBid`, `InvalidAmount` for
    /// zero, or `InsufficientFunds` if the new amount exceeds the unreserved
    /// balance plus the bid's current amount.
    pub fn change_bid(
        &mut self,
        code: &CourseCode,
        claimant: Identity,
        amount: u64,
        ctx: &BidContext<'_>,
    ) -> Result<BidEntry> {
        let record = self.record_or_err(code)?;
        ctx.round.ensure_accepting(ctx.now)?;
        let Some(current) = record.bids.get(&claimant) else {
            return Err(CoursebidError::NoSuchBid {
                course: code.clone(),
                claimant,
            });
        };
        if amount == 0 {
            return Err(CoursebidError::InvalidAmount(0));
        }
        let available = self
            .unreserved(&claimant, ctx.balance)
            .saturating_add(current.amount);
        if amount > available {
            return Err(CoursebidError::InsufficientFunds {
                needed: amount,
                available,
            });
        }

        let entry = self.record_mut(code)?.bids.update(&claimant, amount)?;
        self.reservations
            .entry(claimant)
            .or_default()
            .insert(code.clone(), amount);
        tracing::debug!(
            course = %code,
            %claimant,
            from = current.amount,
            to = amount,
            "bid changed"
        );
        Ok(entry)
    }

    /// Withdraw a live bid, releasing its reservation.
    ///
    /// # Errors
    /// `NoSuchResource`, `RoundClosed` or `NoSuchBid`.
    pub fn remove_bid(
        &mut self,
        code: &CourseCode,
        claimant: &Identity,
        round: &RoundController,
        now: DateTime<Utc>,
    ) -> Result<BidEntry> {
        self.record_or_err(code)?;
        round.ensure_accepting(now)?;
        let removed = self
            .record_mut(code)?
            .bids
            .remove(claimant)
            .ok_or_else(|| CoursebidError::NoSuchBid {
                course: code.clone(),
                claimant: *claimant,
            })?;
        release_reservation(&mut self.reservations, claimant, code);
        tracing::debug!(course = %code, %claimant, amount = removed.amount, "bid removed");
        Ok(removed)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// A claimant's live bid on a course.
    ///
    /// # Errors
    /// Returns `NoSuchResource` for an unknown course.
    pub fn get_bid(&self, code: &CourseCode, claimant: &Identity) -> Result<Option<Bid>> {
        let record = self.record_or_err(code)?;
        Ok(record
            .bids
            .get(claimant)
            .map(|e| Bid::from_entry(code.clone(), e)))
    }

    /// All live bids on a course in priority order.
    ///
    /// # Errors
    /// Returns `NoSuchResource` for an unknown course.
    pub fn get_bids(&self, code: &CourseCode) -> Result<Vec<BidEntry>> {
        Ok(self.record_or_err(code)?.bids.entries().collect())
    }

    /// Accepted claimants of a course in acceptance order.
    ///
    /// # Errors
    /// Returns `NoSuchResource` for an unknown course.
    pub fn get_accepted(&self, code: &CourseCode) -> Result<&[Identity]> {
        Ok(self.record_or_err(code)?.accepted.as_slice())
    }

    /// Credits held by a claimant's live bids.
    #[must_use]
    pub fn reserved(&self, claimant: &Identity) -> u64 {
        self.reservations
            .get(claimant)
            .map_or(0, |r| r.values().sum())
    }

    /// Balance not held by live bids.
    #[must_use]
    pub fn unreserved(&self, claimant: &Identity, balance: u64) -> u64 {
        balance.saturating_sub(self.reserved(claimant))
    }

    /// Live bids of a claimant in ascending course order.
    #[must_use]
    pub fn pending_bids(&self, claimant: &Identity) -> Vec<Bid> {
        let Some(held) = self.reservations.get(claimant) else {
            return Vec::new();
        };
        held.keys()
            .filter_map(|code| {
                let entry = self.courses.get(code)?.bids.get(claimant)?;
                Some(Bid::from_entry(code.clone(), entry))
            })
            .collect()
    }

    /// Total weight of courses the claimant holds live bids on.
    #[must_use]
    pub fn pending_weight(&self, claimant: &Identity) -> u64 {
        self.reservations
            .get(claimant)
            .map_or(0, |held| self.weight_of(held.keys()))
    }

    /// Courses the claimant has been accepted into.
    #[must_use]
    pub fn awarded(&self, claimant: &Identity) -> Vec<CourseCode> {
        self.awards
            .get(claimant)
            .map(|a| a.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_awarded(&self, claimant: &Identity, code: &CourseCode) -> bool {
        self.awards.get(claimant).is_some_and(|a| a.contains(code))
    }

    /// Total weight of awarded courses.
    #[must_use]
    pub fn awarded_weight(&self, claimant: &Identity) -> u64 {
        self.awards
            .get(claimant)
            .map_or(0, |awarded| self.weight_of(awarded.iter()))
    }

    /// Awarded plus pending weight: what the budget ceiling is checked against.
    #[must_use]
    pub fn committed_weight(&self, claimant: &Identity) -> u64 {
        self.awarded_weight(claimant) + self.pending_weight(claimant)
    }

    /// Sum of all live reservations.
    #[must_use]
    pub fn total_reserved(&self) -> u128 {
        self.reservations
            .values()
            .flat_map(BTreeMap::values)
            .map(|a| u128::from(*a))
            .sum()
    }

    fn weight_of<'a>(&self, codes: impl Iterator<Item = &'a CourseCode>) -> u64 {
        codes
            .filter_map(|c| self.courses.get(c))
            .map(|r| u64::from(r.course.weight))
            .sum()
    }

    fn record_or_err(&self, code: &CourseCode) -> Result<&CourseRecord> {
        self.courses
            .get(code)
            .ok_or_else(|| CoursebidError::NoSuchResource(code.clone()))
    }

    fn record_mut(&mut self, code: &CourseCode) -> Result<&mut CourseRecord> {
        self.courses
            .get_mut(code)
            .ok_or_else(|| CoursebidError::NoSuchResource(code.clone()))
    }
}

/// Drop one reservation, pruning the claimant's map when it empties.
pub(crate) fn release_reservation(
    reservations: &mut HashMap<Identity, BTreeMap<CourseCode, u64>>,
    claimant: &Identity,
    code: &CourseCode,
) -> Option<u64> {
    let held = reservations.get_mut(claimant)?;
    let amount = held.remove(code);
    if held.is_empty() {
        reservations.remove(claimant);
    }
    amount
}
