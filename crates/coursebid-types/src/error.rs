//! Error types for the coursebid engine.
//!
//! All errors use the `CB_ERR_` prefix convention for easy grepping in logs.
//! Every variant is a rejected precondition: the operation that produced it
//! left the ledger, catalog and round state untouched.
//!
//! Error codes are grouped by subsystem:
//! - 1xx: Catalog errors
//! - 2xx: Bid errors
//! - 3xx: Ledger / payment errors
//! - 4xx: Round errors
//! - 5xx: Settlement errors
//! - 8xx: Security / authorization errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{CourseCode, Identity, Role};

/// Central error enum for all coursebid operations.
#[derive(Debug, Error)]
pub enum CoursebidError {
    // =================================================================
    // Catalog Errors (1xx)
    // =================================================================
    /// A course with this code already exists.
    #[error("CB_ERR_100: Course already exists: {0}")]
    DuplicateResource(CourseCode),

    /// No course with this code exists.
    #[error("CB_ERR_101: No such course: {0}")]
    NoSuchResource(CourseCode),

    /// Quota must be strictly positive.
    #[error("CB_ERR_102: Invalid quota: {0}")]
    InvalidQuota(u32),

    /// Weight must be strictly positive.
    #[error("CB_ERR_103: Invalid weight: {0}")]
    InvalidWeight(u32),

    /// The course code is empty, too long or contains illegal characters.
    #[error("CB_ERR_104: Invalid course code: {reason}")]
    InvalidCourseCode { reason: String },

    // =================================================================
    // Bid Errors (2xx)
    // =================================================================
    /// The claimant already holds a live bid on this course.
    #[error("CB_ERR_200: Duplicate bid by {claimant} on {course}")]
    DuplicateBid {
        course: CourseCode,
        claimant: Identity,
    },

    /// The claimant holds no live bid on this course.
    #[error("CB_ERR_201: No bid by {claimant} on {course}")]
    NoSuchBid {
        course: CourseCode,
        claimant: Identity,
    },

    /// Bid amounts must be strictly positive.
    #[error("CB_ERR_202: Invalid bid amount: {0}")]
    InvalidAmount(u64),

    /// Awarded plus pending weights would exceed the credit paid in.
    #[error("CB_ERR_203: Budget exceeded: need {needed}, paid in {ceiling}")]
    BudgetExceeded { needed: u64, ceiling: u64 },

    /// A prerequisite course has not been completed.
    #[error("CB_ERR_204: Prerequisite {prerequisite} not met for {course}")]
    PrerequisiteNotMet {
        course: CourseCode,
        prerequisite: CourseCode,
    },

    /// The claimant already holds a seat in this course.
    #[error("CB_ERR_205: {claimant} already awarded a seat in {course}")]
    AlreadyAwarded {
        course: CourseCode,
        claimant: Identity,
    },

    // =================================================================
    // Ledger / Payment Errors (3xx)
    // =================================================================
    /// Not enough unreserved credit for the operation.
    #[error("CB_ERR_300: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// A mint would overflow the claimant's balance.
    #[error("CB_ERR_301: Balance overflow")]
    BalanceOverflow,

    /// The transfer is malformed (e.g. sender equals recipient).
    #[error("CB_ERR_302: Invalid transfer: {reason}")]
    InvalidTransfer { reason: String },

    /// Peer transfers are disabled by configuration.
    #[error("CB_ERR_303: Credit transfers are disabled")]
    TransfersDisabled,

    /// The attached payment does not cover the required fee.
    #[error("CB_ERR_304: Insufficient payment: required {required}, paid {paid}")]
    InsufficientPayment { required: Decimal, paid: Decimal },

    /// The purchase would push the claimant past the credit-purchase ceiling.
    #[error("CB_ERR_305: Credit ceiling exceeded: requested {requested}, remaining {remaining}")]
    CreditCeilingExceeded { requested: u64, remaining: u64 },

    // =================================================================
    // Round Errors (4xx)
    // =================================================================
    /// A round is already open.
    #[error("CB_ERR_400: Bidding round already open")]
    RoundAlreadyOpen,

    /// No round is open, or the open round is past its deadline.
    #[error("CB_ERR_401: Bidding round closed")]
    RoundClosed,

    /// The round cannot be closed before its deadline.
    #[error("CB_ERR_402: Too early to close round: deadline {deadline}")]
    TooEarly {
        deadline: chrono::DateTime<chrono::Utc>,
    },

    /// Round duration is zero or above the configured maximum.
    #[error("CB_ERR_403: Invalid round duration: {secs}s (max {max_secs}s)")]
    InvalidDuration { secs: u64, max_secs: u64 },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// Supply conservation invariant violated.
    #[error("CB_ERR_500: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Security / Authorization Errors (8xx)
    // =================================================================
    /// The caller's role does not permit this action.
    #[error("CB_ERR_800: {caller} ({actual}) not authorized: requires {required}")]
    AuthorizationError {
        caller: Identity,
        required: Role,
        actual: Role,
    },

    /// An ed25519 signature failed to verify.
    #[error("CB_ERR_801: Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// The transfer nonce has already been used by this sender.
    #[error("CB_ERR_802: Replayed nonce {nonce} for {sender}")]
    ReplayedNonce { sender: Identity, nonce: u64 },

    /// The identity already holds a different role.
    #[error("CB_ERR_803: {identity} already holds role {existing}")]
    RoleConflict { identity: Identity, existing: Role },

    /// The student is already enrolled.
    #[error("CB_ERR_804: {0} already enrolled")]
    AlreadyEnrolled(Identity),

    /// The identity is not an enrolled student.
    #[error("CB_ERR_805: {0} is not enrolled")]
    NotEnrolled(Identity),

    /// Enrollment credit cap exceeds the configured purchase ceiling.
    #[error("CB_ERR_806: Credit cap {requested} exceeds maximum {max}")]
    CreditCapExceeded { requested: u64, max: u64 },

    /// Too many nonces remembered for this sender.
    #[error("CB_ERR_807: Nonce capacity exhausted for {0}")]
    NonceCapacityExhausted(Identity),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("CB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("CB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("CB_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("CB_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, CoursebidError>;

impl From<std::io::Error> for CoursebidError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CoursebidError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = CoursebidError::NoSuchResource(CourseCode::new("CS101").unwrap());
        let msg = format!("{err}");
        assert!(msg.starts_with("CB_ERR_101"), "Got: {msg}");
        assert!(msg.contains("CS101"));
    }

    #[test]
    fn insufficient_funds_display() {
        let err = CoursebidError::InsufficientFunds {
            needed: 900,
            available: 400,
        };
        let msg = format!("{err}");
        assert!(msg.contains("CB_ERR_300"));
        assert!(msg.contains("900"));
        assert!(msg.contains("400"));
    }

    #[test]
    fn authorization_display_names_roles() {
        let err = CoursebidError::AuthorizationError {
            caller: Identity([7u8; 32]),
            required: Role::Admin,
            actual: Role::Student,
        };
        let msg = format!("{err}");
        assert!(msg.contains("CB_ERR_800"));
        assert!(msg.contains("ADMIN"));
        assert!(msg.contains("STUDENT"));
    }

    #[test]
    fn all_errors_have_cb_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(CoursebidError::RoundAlreadyOpen),
            Box::new(CoursebidError::RoundClosed),
            Box::new(CoursebidError::BalanceOverflow),
            Box::new(CoursebidError::TransfersDisabled),
            Box::new(CoursebidError::Internal("test".into())),
            Box::new(CoursebidError::ReplayedNonce {
                sender: Identity([1u8; 32]),
                nonce: 3,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("CB_ERR_"),
                "Error missing CB_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let err: CoursebidError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, CoursebidError::Serialization(_)));
    }
}
