//! Credit ledger: the single source of truth for claimant balances.
//!
//! All mutations are atomic: either the full operation succeeds or the
//! ledger is unchanged. Balances are unsigned, so a negative balance is
//! unrepresentable; every debit checks before it subtracts.

use std::collections::HashMap;

use coursebid_types::{CoursebidError, Identity, Result};

use crate::supply_conservation::SupplyConservation;

/// Per-claimant credit balances with mint/burn accounting.
#[derive(Debug, Default)]
pub struct CreditLedger {
    balances: HashMap<Identity, u64>,
    supply: SupplyConservation,
}

impl CreditLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance. Unknown claimants hold zero.
    #[must_use]
    pub fn balance(&self, who: &Identity) -> u64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Create credits for a claimant.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the balance would exceed `u64::MAX`.
    pub fn mint(&mut self, who: Identity, amount: u64) -> Result<()> {
        let current = self.balance(&who);
        let next = current
            .checked_add(amount)
            .ok_or(CoursebidError::BalanceOverflow)?;
        self.balances.insert(who, next);
        self.supply.record_mint(amount);
        tracing::debug!(claimant = %who, amount, balance = next, "credits minted");
        Ok(())
    }

    /// Destroy credits held by a claimant.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if `amount > balance`.
    pub fn burn(&mut self, who: Identity, amount: u64) -> Result<()> {
        let current = self.balance(&who);
        if amount > current {
            return Err(CoursebidError::InsufficientFunds {
                needed: amount,
                available: current,
            });
        }
        self.balances.insert(who, current - amount);
        self.supply.record_burn(amount);
        tracing::debug!(claimant = %who, amount, balance = current - amount, "credits burned");
        Ok(())
    }

    /// Move credits between claimants. Supply-neutral.
    ///
    /// Both sides are checked before either is written, so a failed transfer
    /// leaves no trace.
    ///
    /// # Errors
    /// - `InvalidTransfer` if `from == to`
    /// - `InsufficientFunds` if `amount > balance(from)`
    /// - `BalanceOverflow` if the recipient's balance would overflow
    pub fn transfer(&mut self, from: Identity, to: Identity, amount: u64) -> Result<()> {
        if from == to {
            return Err(CoursebidError::InvalidTransfer {
                reason: format!("sender and recipient are both {from}"),
            });
        }
        let from_balance = self.balance(&from);
        if amount > from_balance {
            return Err(CoursebidError::InsufficientFunds {
                needed: amount,
                available: from_balance,
            });
        }
        let to_balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(CoursebidError::BalanceOverflow)?;

        self.balances.insert(from, from_balance - amount);
        self.balances.insert(to, to_balance);
        tracing::debug!(%from, %to, amount, "credits transferred");
        Ok(())
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| u128::from(*b)).sum()
    }

    /// Check `Σ balances == minted − burned`.
    pub fn verify_supply(&self) -> Result<()> {
        self.supply.verify(self.total_supply())
    }

    #[must_use]
    pub fn minted_total(&self) -> u128 {
        self.supply.minted_total()
    }

    #[must_use]
    pub fn burned_total(&self) -> u128 {
        self.supply.burned_total()
    }
}
