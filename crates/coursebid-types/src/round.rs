//! Bidding round lifecycle types.
//!
//! A round cycles through two states:
//! **CLOSED → OPEN(deadline) → CLOSED**
//!
//! While OPEN and before the deadline, bids may be placed, changed and
//! removed. After the deadline the round stays formally OPEN (no further
//! bid activity) until an explicit close runs settlement.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RoundId;

/// State of the single global bidding round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundState {
    /// No round in progress. Initial state.
    #[default]
    Closed,
    /// A round is in progress until `deadline`.
    Open {
        id: RoundId,
        opened_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    },
}

impl RoundState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Whether bids may be placed, changed or removed at `now`.
    ///
    /// The deadline itself is still inside the window; activity stops once
    /// `now > deadline`.
    #[must_use]
    pub fn accepts_bids_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Closed => false,
            Self::Open { deadline, .. } => now <= *deadline,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Closed => None,
            Self::Open { deadline, .. } => Some(*deadline),
        }
    }

    #[must_use]
    pub fn round_id(&self) -> Option<RoundId> {
        match self {
            Self::Closed => None,
            Self::Open { id, .. } => Some(*id),
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open { id, deadline, .. } => write!(f, "OPEN({id} until {deadline})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn closed_never_accepts() {
        let state = RoundState::Closed;
        assert!(!state.is_open());
        assert!(!state.accepts_bids_at(Utc::now()));
        assert_eq!(state.deadline(), None);
        assert_eq!(format!("{state}"), "CLOSED");
    }

    #[test]
    fn open_accepts_until_deadline_inclusive() {
        let now = Utc::now();
        let deadline = now + Duration::seconds(60);
        let state = RoundState::Open {
            id: RoundId(1),
            opened_at: now,
            deadline,
        };
        assert!(state.accepts_bids_at(now));
        assert!(state.accepts_bids_at(deadline));
        assert!(!state.accepts_bids_at(deadline + Duration::seconds(1)));
        assert_eq!(state.round_id(), Some(RoundId(1)));
    }

    #[test]
    fn serde_roundtrip() {
        let now = Utc::now();
        let state = RoundState::Open {
            id: RoundId(4),
            opened_at: now,
            deadline: now + Duration::hours(2),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: RoundState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
