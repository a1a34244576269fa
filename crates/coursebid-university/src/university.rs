//! The university: one engine instance wiring roles, ledger, catalog and
//! round controller together.
//!
//! Every mutating operation follows the same shape:
//! 1. Check the caller's role
//! 2. Validate everything that can fail
//! 3. Apply the change
//! 4. Append an audit event
//!
//! A failed operation leaves no trace, including in the audit trail.

use chrono::{DateTime, Utc};
use coursebid_auction::{
    BidContext, ResourceCatalog, RoundController, apply_settlement, plan_settlement,
};
use coursebid_ledger::{CreditLedger, FeeSchedule, NonceTracker, PurchaseReceipt};
use coursebid_types::{
    Bid, BidEntry, Course, CourseCode, CoursebidError, EngineConfig, EnrollmentAuthorization,
    EventKind, Identity, Result, Role, RoundId, RoundState, SettlementReport, SystemId,
    TransferAuthorization, UniversityEvent,
};
use rust_decimal::Decimal;

use crate::clock::{Clock, SystemClock};
use crate::prerequisites::CompletionRegistry;
use crate::roles::{RoleOracle, RoleRegistry};
use crate::signature::{verify_enrollment, verify_transfer};

/// A single coursebid instance.
pub struct University {
    config: EngineConfig,
    roles: RoleRegistry,
    ledger: CreditLedger,
    fees: FeeSchedule,
    nonces: NonceTracker,
    completions: CompletionRegistry,
    catalog: ResourceCatalog,
    round: RoundController,
    clock: Box<dyn Clock>,
    events: Vec<UniversityEvent>,
    next_sequence: u64,
    last_settlement: Option<SettlementReport>,
}

impl std::fmt::Debug for University {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("University")
            .field("system_id", &self.config.system_id)
            .field("chief", &self.roles.chief())
            .field("courses", &self.catalog.len())
            .field("round", &self.round.state())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl University {
    /// Create an instance with `chief` as root authority.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` does not validate.
    pub fn new(config: EngineConfig, chief: Identity, clock: impl Clock + 'static) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            system_id = %config.system_id,
            %chief,
            transfers_enabled = config.transfers_enabled,
            "university created"
        );
        Ok(Self {
            roles: RoleRegistry::new(chief),
            ledger: CreditLedger::new(),
            fees: FeeSchedule::new(config.fees.clone()),
            nonces: NonceTracker::new(config.nonce_capacity_per_claimant),
            completions: CompletionRegistry::new(),
            catalog: ResourceCatalog::new(),
            round: RoundController::new(config.max_round_duration_secs),
            clock: Box::new(clock),
            events: Vec::new(),
            next_sequence: 0,
            last_settlement: None,
            config,
        })
    }

    /// Create an instance on wall-clock time.
    pub fn with_system_clock(config: EngineConfig, chief: Identity) -> Result<Self> {
        Self::new(config, chief, SystemClock)
    }

    // =================================================================
    // Roles and enrollment
    // =================================================================

    pub fn appoint_admin(&mut self, caller: &Identity, who: Identity) -> Result<()> {
        self.roles.appoint_admin(caller, who)?;
        self.record(EventKind::RoleGranted {
            identity: who,
            role: Role::Admin,
        });
        Ok(())
    }

    /// Returns `false` if `who` held no admin role.
    pub fn revoke_admin(&mut self, caller: &Identity, who: &Identity) -> Result<bool> {
        let revoked = self.roles.revoke_admin(caller, who)?;
        if revoked {
            self.record(EventKind::RoleRevoked {
                identity: *who,
                role: Role::Admin,
            });
        }
        Ok(revoked)
    }

    pub fn appoint_lecturer(&mut self, caller: &Identity, who: Identity) -> Result<()> {
        self.roles.appoint_lecturer(caller, who)?;
        self.record(EventKind::RoleGranted {
            identity: who,
            role: Role::Lecturer,
        });
        Ok(())
    }

    /// Admit a student on an admin's signed authorization.
    ///
    /// # Errors
    /// - `AuthorizationError` if the named signer is not an admin
    /// - `InvalidSignature` if the signature does not verify
    /// - `CreditCapExceeded` if the cap is above the configured purchase max
    /// - `AlreadyEnrolled` / `RoleConflict` if the student holds a role
    pub fn enroll(&mut self, auth: &EnrollmentAuthorization) -> Result<()> {
        self.roles.require(&auth.admin, Role::Admin)?;
        if let Err(e) = verify_enrollment(auth, &self.config.system_id) {
            tracing::warn!(admin = %auth.admin, student = %auth.student, error = %e, "enrollment signature rejected");
            return Err(e);
        }
        let max = self.config.fees.max_credits_per_claimant;
        if auth.credit_cap > max {
            return Err(CoursebidError::CreditCapExceeded {
                requested: auth.credit_cap,
                max,
            });
        }
        self.roles.register_student(auth.student)?;
        self.fees.set_cap(auth.student, auth.credit_cap)?;
        self.record(EventKind::Enrolled {
            student: auth.student,
            credit_cap: auth.credit_cap,
        });
        Ok(())
    }

    // =================================================================
    // Credits
    // =================================================================

    /// Convert an external payment into credits.
    pub fn purchase_credits(
        &mut self,
        student: &Identity,
        credits: u64,
        payment: Decimal,
    ) -> Result<PurchaseReceipt> {
        self.roles.require(student, Role::Student)?;
        let receipt = self
            .fees
            .purchase(&mut self.ledger, *student, credits, payment)?;
        self.record(EventKind::CreditsPurchased {
            student: *student,
            credits,
            paid: payment,
        });
        Ok(receipt)
    }

    /// Move credits between students on the sender's signed order.
    ///
    /// `fee` is the external payment covering the transfer fee; it never
    /// touches the credit ledger.
    ///
    /// # Errors
    /// - `TransfersDisabled` unless enabled in config
    /// - `AuthorizationError` if the sender is not a student
    /// - `NotEnrolled` if the recipient is not a student
    /// - `InvalidAmount` for a zero amount
    /// - `InvalidSignature`, `ReplayedNonce`, `NonceCapacityExhausted`
    /// - `InsufficientPayment` if `fee` is below the transfer fee
    /// - `InsufficientFunds` if the amount exceeds the sender's unreserved
    ///   credit
    pub fn transfer(&mut self, auth: &TransferAuthorization, fee: Decimal) -> Result<()> {
        if !self.config.transfers_enabled {
            return Err(CoursebidError::TransfersDisabled);
        }
        self.roles.require(&auth.from, Role::Student)?;
        if self.roles.role_of(&auth.to) != Role::Student {
            return Err(CoursebidError::NotEnrolled(auth.to));
        }
        if auth.amount == 0 {
            return Err(CoursebidError::InvalidAmount(0));
        }
        if let Err(e) = verify_transfer(auth, &self.config.system_id) {
            tracing::warn!(from = %auth.from, nonce = auth.nonce, error = %e, "transfer signature rejected");
            return Err(e);
        }
        if let Err(e) = self.nonces.check(&auth.from, auth.nonce) {
            tracing::warn!(from = %auth.from, nonce = auth.nonce, error = %e, "transfer nonce rejected");
            return Err(e);
        }
        self.fees.check_transfer_fee(fee)?;
        let available = self.unreserved(&auth.from);
        if auth.amount > available {
            return Err(CoursebidError::InsufficientFunds {
                needed: auth.amount,
                available,
            });
        }

        self.ledger.transfer(auth.from, auth.to, auth.amount)?;
        self.nonces.record(auth.from, auth.nonce);
        self.fees.record_transfer_fee(fee);
        self.record(EventKind::CreditsTransferred {
            from: auth.from,
            to: auth.to,
            amount: auth.amount,
            nonce: auth.nonce,
            fee,
        });
        Ok(())
    }

    // =================================================================
    // Courses
    // =================================================================

    /// Register a course owned by a lecturer.
    ///
    /// # Errors
    /// `AuthorizationError` unless `caller` is an admin and the owner a
    /// lecturer; otherwise the catalog's validation errors.
    pub fn create_course(&mut self, caller: &Identity, course: Course) -> Result<()> {
        self.roles.require(caller, Role::Admin)?;
        self.roles.require(&course.owner, Role::Lecturer)?;
        let (code, owner) = (course.code.clone(), course.owner);
        self.catalog.create_course(course)?;
        self.record(EventKind::CourseCreated {
            course: code,
            owner,
        });
        Ok(())
    }

    /// Record that `student` completed `code`. Only the course's lecturer or
    /// an admin may do this. Returns `false` if already recorded.
    pub fn mark_completed(
        &mut self,
        caller: &Identity,
        student: Identity,
        code: &CourseCode,
    ) -> Result<bool> {
        let course = self
            .catalog
            .course(code)
            .ok_or_else(|| CoursebidError::NoSuchResource(code.clone()))?;
        let actual = self.roles.role_of(caller);
        if course.owner != *caller && !actual.satisfies(Role::Admin) {
            return Err(CoursebidError::AuthorizationError {
                caller: *caller,
                required: Role::Lecturer,
                actual,
            });
        }
        if self.roles.role_of(&student) != Role::Student {
            return Err(CoursebidError::NotEnrolled(student));
        }
        let added = self.completions.mark_completed(student, code.clone());
        if added {
            self.record(EventKind::CourseCompleted {
                student,
                course: code.clone(),
            });
        }
        Ok(added)
    }

    // =================================================================
    // Rounds
    // =================================================================

    pub fn open_round(&mut self, caller: &Identity, duration_secs: u64) -> Result<RoundId> {
        self.roles.require(caller, Role::Admin)?;
        let id = self.round.open_round(duration_secs, self.clock.now())?;
        if let Some(deadline) = self.round.deadline() {
            self.record(EventKind::RoundOpened {
                round_id: id,
                deadline,
            });
        }
        Ok(id)
    }

    /// Close the round and settle it.
    ///
    /// Settlement is planned against the catalog first. Every burn is
    /// checked against the ledger before any is applied, so the close either
    /// happens in full or not at all.
    ///
    /// # Errors
    /// - `AuthorizationError` unless `caller` is an admin
    /// - `RoundClosed` if no round is open
    /// - `TooEarly` if the deadline has not passed
    /// - `SupplyInvariantViolation` if a winner cannot cover their burn
    pub fn close_round(&mut self, caller: &Identity) -> Result<SettlementReport> {
        self.roles.require(caller, Role::Admin)?;
        let now = self.clock.now();
        let round_id = self.round.closable_round(now)?;
        let report = plan_settlement(&self.catalog, round_id, now);

        for (claimant, amount) in report.burns_by_claimant() {
            let balance = self.ledger.balance(&claimant);
            if amount > u128::from(balance) {
                return Err(CoursebidError::SupplyInvariantViolation {
                    reason: format!(
                        "{claimant} owes {amount} for awards in {round_id} but holds {balance}"
                    ),
                });
            }
        }
        for award in &report.awards {
            self.ledger.burn(award.claimant, award.amount)?;
        }
        apply_settlement(&mut self.catalog, &report);
        self.round.mark_closed();
        self.ledger.verify_supply()?;

        self.record(EventKind::RoundSettled {
            round_id,
            awards: report.awards.len(),
            burned: report.burned_total(),
            award_root: report.award_root,
        });
        self.last_settlement = Some(report.clone());
        Ok(report)
    }

    // =================================================================
    // Bids
    // =================================================================

    pub fn place_bid(
        &mut self,
        claimant: &Identity,
        code: &CourseCode,
        amount: u64,
    ) -> Result<BidEntry> {
        self.roles.require(claimant, Role::Student)?;
        let ctx = BidContext {
            round: &self.round,
            now: self.clock.now(),
            balance: self.ledger.balance(claimant),
            budget_ceiling: self.budget_ceiling(claimant),
            prerequisites: &self.completions,
        };
        let entry = self.catalog.place_bid(code, *claimant, amount, &ctx)?;
        self.record(EventKind::BidPlaced {
            course: code.clone(),
            claimant: *claimant,
            amount,
        });
        Ok(entry)
    }

    pub fn change_bid(
        &mut self,
        claimant: &Identity,
        code: &CourseCode,
        amount: u64,
    ) -> Result<BidEntry> {
        self.roles.require(claimant, Role::Student)?;
        let previous = self
            .catalog
            .get_bid(code, claimant)?
            .map_or(0, |b| b.amount);
        let ctx = BidContext {
            round: &self.round,
            now: self.clock.now(),
            balance: self.ledger.balance(claimant),
            budget_ceiling: self.budget_ceiling(claimant),
            prerequisites: &self.completions,
        };
        let entry = self.catalog.change_bid(code, *claimant, amount, &ctx)?;
        self.record(EventKind::BidChanged {
            course: code.clone(),
            claimant: *claimant,
            from: previous,
            to: amount,
        });
        Ok(entry)
    }

    pub fn remove_bid(&mut self, claimant: &Identity, code: &CourseCode) -> Result<BidEntry> {
        self.roles.require(claimant, Role::Student)?;
        let now = self.clock.now();
        let removed = self.catalog.remove_bid(code, claimant, &self.round, now)?;
        self.record(EventKind::BidRemoved {
            course: code.clone(),
            claimant: *claimant,
            amount: removed.amount,
        });
        Ok(removed)
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn balance(&self, who: &Identity) -> u64 {
        self.ledger.balance(who)
    }

    #[must_use]
    pub fn reserved(&self, who: &Identity) -> u64 {
        self.catalog.reserved(who)
    }

    /// Balance not held by live bids: what a new bid or transfer may use.
    #[must_use]
    pub fn unreserved(&self, who: &Identity) -> u64 {
        self.catalog.unreserved(who, self.ledger.balance(who))
    }

    pub fn get_bid(&self, code: &CourseCode, claimant: &Identity) -> Result<Option<Bid>> {
        self.catalog.get_bid(code, claimant)
    }

    pub fn get_bids(&self, code: &CourseCode) -> Result<Vec<BidEntry>> {
        self.catalog.get_bids(code)
    }

    pub fn get_accepted(&self, code: &CourseCode) -> Result<&[Identity]> {
        self.catalog.get_accepted(code)
    }

    #[must_use]
    pub fn pending_bids(&self, claimant: &Identity) -> Vec<Bid> {
        self.catalog.pending_bids(claimant)
    }

    #[must_use]
    pub fn awarded(&self, claimant: &Identity) -> Vec<CourseCode> {
        self.catalog.awarded(claimant)
    }

    #[must_use]
    pub fn course(&self, code: &CourseCode) -> Option<&Course> {
        self.catalog.course(code)
    }

    #[must_use]
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn is_bidding_open(&self) -> bool {
        self.round.is_bidding_open(self.clock.now())
    }

    #[must_use]
    pub fn round_state(&self) -> RoundState {
        self.round.state()
    }

    #[must_use]
    pub fn role_of(&self, who: &Identity) -> Role {
        self.roles.role_of(who)
    }

    /// Budget ceiling for course weight: total credit paid in.
    #[must_use]
    pub fn budget_ceiling(&self, who: &Identity) -> u64 {
        self.fees.paid_in(who)
    }

    /// Most credits `who` may ever purchase.
    #[must_use]
    pub fn credit_cap(&self, who: &Identity) -> u64 {
        self.fees.ceiling(who)
    }

    #[must_use]
    pub fn completed_by(&self, student: &Identity) -> Vec<CourseCode> {
        self.completions.completed_by(student)
    }

    #[must_use]
    pub fn quote(&self, credits: u64) -> Decimal {
        self.fees.quote(credits)
    }

    #[must_use]
    pub fn remaining_allowance(&self, who: &Identity) -> u64 {
        self.fees.remaining_allowance(who)
    }

    /// External payments kept by the instance.
    #[must_use]
    pub fn fees_collected(&self) -> Decimal {
        self.fees.collected()
    }

    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    pub fn verify_supply(&self) -> Result<()> {
        self.ledger.verify_supply()
    }

    #[must_use]
    pub fn last_settlement(&self) -> Option<&SettlementReport> {
        self.last_settlement.as_ref()
    }

    #[must_use]
    pub fn events(&self) -> &[UniversityEvent] {
        &self.events
    }

    /// Take the audit events recorded so far. Sequence numbers keep counting.
    pub fn drain_events(&mut self) -> Vec<UniversityEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn system_id(&self) -> &SystemId {
        &self.config.system_id
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn record(&mut self, kind: EventKind) {
        let event = UniversityEvent {
            sequence: self.next_sequence,
            at: self.clock.now(),
            kind,
        };
        self.next_sequence += 1;
        self.events.push(event);
    }
}
