//! # coursebid-types
//!
//! Shared types, errors, and configuration for the **coursebid** seat
//! auction engine.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Identity`], [`CourseCode`], [`RoundId`], [`AwardId`], [`SystemId`]
//! - **Catalog model**: [`Course`]
//! - **Bid model**: [`Bid`], [`BidEntry`]
//! - **Round model**: [`RoundState`]
//! - **Settlement model**: [`Award`], [`Rejection`], [`DiscardedBid`], [`CourseSettlement`], [`SettlementReport`]
//! - **Roles**: [`Role`]
//! - **Signed actions**: [`EnrollmentAuthorization`], [`TransferAuthorization`]
//! - **Audit trail**: [`UniversityEvent`]
//! - **Configuration**: [`EngineConfig`], [`FeeConfig`]
//! - **Errors**: [`CoursebidError`] with `CB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod award;
pub mod bid;
pub mod config;
pub mod constants;
pub mod course;
pub mod error;
pub mod event;
pub mod ids;
pub mod role;
pub mod round;
pub mod signing;

pub use award::*;
pub use bid::*;
pub use config::*;
pub use course::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use role::*;
pub use round::*;
pub use signing::*;

// Constants are accessed via `coursebid_types::constants::FOO`.
