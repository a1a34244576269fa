//! Audit trail events emitted by the orchestrator.
//!
//! Every state-changing operation that succeeds appends exactly one event.
//! Failed operations append nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CourseCode, Identity, Role, RoundId};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    RoleGranted { identity: Identity, role: Role },
    RoleRevoked { identity: Identity, role: Role },
    Enrolled { student: Identity, credit_cap: u64 },
    CreditsPurchased { student: Identity, credits: u64, paid: Decimal },
    CreditsTransferred { from: Identity, to: Identity, amount: u64, nonce: u64, fee: Decimal },
    CourseCreated { course: CourseCode, owner: Identity },
    CourseCompleted { student: Identity, course: CourseCode },
    RoundOpened { round_id: RoundId, deadline: DateTime<Utc> },
    BidPlaced { course: CourseCode, claimant: Identity, amount: u64 },
    BidChanged { course: CourseCode, claimant: Identity, from: u64, to: u64 },
    BidRemoved { course: CourseCode, claimant: Identity, amount: u64 },
    RoundSettled { round_id: RoundId, awards: usize, burned: u128, award_root: [u8; 32] },
}

/// A timestamped audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityEvent {
    /// Position in the audit trail, starting at zero.
    pub sequence: u64,
    pub at: DateTime<Utc>,
    pub kind: EventKind,
}
