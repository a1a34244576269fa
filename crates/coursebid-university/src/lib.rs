//! # coursebid-university
//!
//! **Orchestrator for a coursebid instance.**
//!
//! Wires the credit ledger and the auction engine to the collaborators they
//! only see through narrow interfaces:
//!
//! - **Roles**: [`RoleRegistry`] behind [`RoleOracle`]
//! - **Signatures**: ed25519 verification of enrollments and transfers
//! - **Prerequisites**: [`CompletionRegistry`] behind
//!   [`coursebid_auction::PrerequisiteOracle`]
//! - **Time**: [`Clock`], with [`ManualClock`] for tests and simulation
//!
//! [`University`] runs each operation to completion; [`SharedUniversity`]
//! serializes operations across threads.

pub mod clock;
pub mod prerequisites;
pub mod roles;
pub mod shared;
pub mod signature;
pub mod university;

pub use clock::{Clock, ManualClock, SystemClock};
pub use prerequisites::CompletionRegistry;
pub use roles::{RoleOracle, RoleRegistry};
pub use shared::SharedUniversity;
pub use signature::{
    identity_of, sign, sign_enrollment, sign_transfer, verify_enrollment, verify_signature,
    verify_transfer,
};
pub use university::University;
