//! # coursebid-auction
//!
//! **Pure auction engine for coursebid.**
//!
//! Holds the course catalog, every course's priority bid list and the
//! global round state, and turns a closed round into a
//! [`coursebid_types::SettlementReport`]. It has:
//!
//! - **No ledger access**: callers pass balances in and apply burns out
//! - **Deterministic output**: the same catalog settles to the same awards
//!   and award root on every replica
//! - **Funded bids**: a claimant's live bids never exceed their balance

pub mod bid_list;
pub mod catalog;
pub mod determinism;
pub mod prerequisite;
pub mod round;
pub mod settlement;

pub use bid_list::PriorityBidList;
pub use catalog::{BidContext, CourseRecord, ResourceCatalog};
pub use determinism::{compute_award_root, verify_award_root};
pub use prerequisite::{NoCompletions, PrerequisiteOracle};
pub use round::RoundController;
pub use settlement::{apply_settlement, plan_settlement, settle_round};
