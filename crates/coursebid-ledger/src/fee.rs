//! Fee schedule: converts external payments into credit mints.
//!
//! Payments are decimal amounts in whatever currency the host settles in.
//! They never enter the credit ledger; the schedule keeps a running total of
//! collected fees instead.

use std::collections::HashMap;

use coursebid_types::{CoursebidError, FeeConfig, Identity, Result};
use rust_decimal::Decimal;

use crate::credit_ledger::CreditLedger;

/// Outcome of a successful credit purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub claimant: Identity,
    pub credits: u64,
    pub paid: Decimal,
    /// Lifetime credits purchased by this claimant, including this one.
    pub paid_in_total: u64,
}

/// Prices credits and transfers, and enforces the purchase ceiling.
///
/// A claimant's purchase ceiling is the configured maximum, lowered by any
/// per-claimant cap set with [`FeeSchedule::set_cap`].
#[derive(Debug)]
pub struct FeeSchedule {
    config: FeeConfig,
    /// Lifetime credits purchased per claimant.
    paid_in: HashMap<Identity, u64>,
    caps: HashMap<Identity, u64>,
    /// Total payments kept by the system.
    collected: Decimal,
}

impl FeeSchedule {
    #[must_use]
    pub fn new(config: FeeConfig) -> Self {
        Self {
            config,
            paid_in: HashMap::new(),
            caps: HashMap::new(),
            collected: Decimal::ZERO,
        }
    }

    /// Payment required for `credits`.
    #[must_use]
    pub fn quote(&self, credits: u64) -> Decimal {
        self.config.price_per_credit * Decimal::from(credits)
    }

    /// Lower `who`'s purchase ceiling below the configured maximum.
    ///
    /// # Errors
    /// Returns `CreditCapExceeded` if `cap` is above the maximum.
    pub fn set_cap(&mut self, who: Identity, cap: u64) -> Result<()> {
        let max = self.config.max_credits_per_claimant;
        if cap > max {
            return Err(CoursebidError::CreditCapExceeded { requested: cap, max });
        }
        self.caps.insert(who, cap);
        Ok(())
    }

    /// Most credits `who` may ever purchase.
    #[must_use]
    pub fn ceiling(&self, who: &Identity) -> u64 {
        self.caps
            .get(who)
            .copied()
            .unwrap_or(self.config.max_credits_per_claimant)
    }

    /// Credits the claimant may still purchase.
    #[must_use]
    pub fn remaining_allowance(&self, who: &Identity) -> u64 {
        self.ceiling(who).saturating_sub(self.paid_in(who))
    }

    /// Lifetime credits purchased by `who`. This is the claimant's budget
    /// ceiling for course weight.
    #[must_use]
    pub fn paid_in(&self, who: &Identity) -> u64 {
        self.paid_in.get(who).copied().unwrap_or(0)
    }

    /// Validate a payment and mint the credits it buys.
    ///
    /// # Errors
    /// - `InvalidAmount` if `credits == 0`
    /// - `InsufficientPayment` if `payment` is below the quote
    /// - `CreditCeilingExceeded` if the purchase passes the ceiling
    /// - `BalanceOverflow` from the ledger
    pub fn purchase(
        &mut self,
        ledger: &mut CreditLedger,
        who: Identity,
        credits: u64,
        payment: Decimal,
    ) -> Result<PurchaseReceipt> {
        if credits == 0 {
            return Err(CoursebidError::InvalidAmount(0));
        }
        let required = self.quote(credits);
        if payment < required {
            return Err(CoursebidError::InsufficientPayment {
                required,
                paid: payment,
            });
        }
        let remaining = self.remaining_allowance(&who);
        if credits > remaining {
            return Err(CoursebidError::CreditCeilingExceeded {
                requested: credits,
                remaining,
            });
        }

        ledger.mint(who, credits)?;

        let total = self.paid_in(&who) + credits;
        self.paid_in.insert(who, total);
        self.collected += payment;
        Ok(PurchaseReceipt {
            claimant: who,
            credits,
            paid: payment,
            paid_in_total: total,
        })
    }

    /// Check that a payment covers the transfer fee.
    ///
    /// # Errors
    /// Returns `InsufficientPayment` if `payment < transfer_fee`.
    pub fn check_transfer_fee(&self, payment: Decimal) -> Result<()> {
        if payment < self.config.transfer_fee {
            return Err(CoursebidError::InsufficientPayment {
                required: self.config.transfer_fee,
                paid: payment,
            });
        }
        Ok(())
    }

    /// Keep a transfer fee already validated by [`Self::check_transfer_fee`].
    pub fn record_transfer_fee(&mut self, payment: Decimal) {
        self.collected += payment;
    }

    /// Total payments kept by the system.
    #[must_use]
    pub fn collected(&self) -> Decimal {
        self.collected
    }

    #[must_use]
    pub fn config(&self) -> &FeeConfig {
        &self.config
    }
}
