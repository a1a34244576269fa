//! Supply conservation invariant checker.
//!
//! Mathematical invariant enforced after every settlement:
//! ```text
//! Σ(balances) == Σ(minted) - Σ(burned)
//! ```
//!
//! Transfers move credits between claimants and never change either side
//! of the equation.

use coursebid_types::{CoursebidError, Result};

/// Tracks lifetime mint and burn totals.
#[derive(Debug, Default, Clone)]
pub struct SupplyConservation {
    minted: u128,
    burned: u128,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mint(&mut self, amount: u64) {
        self.minted += u128::from(amount);
    }

    pub fn record_burn(&mut self, amount: u64) {
        self.burned += u128::from(amount);
    }

    /// Expected circulating supply: minted - burned.
    #[must_use]
    pub fn expected_supply(&self) -> u128 {
        self.minted.saturating_sub(self.burned)
    }

    #[must_use]
    pub fn minted_total(&self) -> u128 {
        self.minted
    }

    #[must_use]
    pub fn burned_total(&self) -> u128 {
        self.burned
    }

    /// Verify that the actual supply (sum of all balances) matches.
    ///
    /// # Errors
    /// Returns [`CoursebidError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply();
        if self.burned > self.minted || actual_supply != expected {
            return Err(CoursebidError::SupplyInvariantViolation {
                reason: format!(
                    "actual supply {actual_supply} != expected {expected} \
                     (minted={}, burned={})",
                    self.minted, self.burned
                ),
            });
        }
        Ok(())
    }
}
