//! # coursebid-ledger
//!
//! **Credit plane**: the admission-token ledger and the collaborators that
//! move credits in and between claimants.
//!
//! ## Architecture
//!
//! 1. **CreditLedger**: per-claimant balances; mint, burn, atomic transfer
//! 2. **SupplyConservation**: tracks minted/burned totals and proves
//!    `Σ balances == minted − burned`
//! 3. **FeeSchedule**: converts an external payment into a mint, enforcing
//!    the fee and the per-claimant purchase ceiling
//! 4. **NonceTracker**: one-time nonces for signed peer transfers
//!
//! The ledger knows nothing about bids. Reservations are a view computed by
//! the catalog; only settlement burns credits.

pub mod credit_ledger;
pub mod fee;
pub mod nonce;
pub mod supply_conservation;

pub use credit_ledger::CreditLedger;
pub use fee::{FeeSchedule, PurchaseReceipt};
pub use nonce::NonceTracker;
pub use supply_conservation::SupplyConservation;
