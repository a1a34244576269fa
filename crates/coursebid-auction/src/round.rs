//! Round controller: gates bid activity on the global round state.
//!
//! Exactly one round exists at a time. Bids are accepted while the round
//! is open and `now <= deadline`; closing requires `now > deadline`.

use chrono::{DateTime, TimeDelta, Utc};
use coursebid_types::{CoursebidError, Result, RoundId, RoundState};

/// Owns the [`RoundState`] and the round counter.
#[derive(Debug)]
pub struct RoundController {
    state: RoundState,
    last_round: RoundId,
    max_duration_secs: u64,
}

impl RoundController {
    /// Create a controller in the CLOSED state.
    #[must_use]
    pub fn new(max_duration_secs: u64) -> Self {
        Self {
            state: RoundState::Closed,
            last_round: RoundId::default(),
            max_duration_secs,
        }
    }

    /// Open a new round lasting `duration_secs` from `now`.
    ///
    /// # Errors
    /// - `RoundAlreadyOpen` if a round is in progress
    /// - `InvalidDuration` if the duration is zero or above the maximum
    pub fn open_round(&mut self, duration_secs: u64, now: DateTime<Utc>) -> Result<RoundId> {
        if self.state.is_open() {
            return Err(CoursebidError::RoundAlreadyOpen);
        }
        let invalid = || CoursebidError::InvalidDuration {
            secs: duration_secs,
            max_secs: self.max_duration_secs,
        };
        if duration_secs == 0 || duration_secs > self.max_duration_secs {
            return Err(invalid());
        }
        let delta = i64::try_from(duration_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(invalid)?;
        let deadline = now.checked_add_signed(delta).ok_or_else(invalid)?;

        let id = self.last_round.next();
        self.last_round = id;
        self.state = RoundState::Open {
            id,
            opened_at: now,
            deadline,
        };
        tracing::info!(round = %id, %deadline, "bidding round opened");
        Ok(id)
    }

    /// Whether bid activity is allowed at `now`.
    #[must_use]
    pub fn is_bidding_open(&self, now: DateTime<Utc>) -> bool {
        self.state.accepts_bids_at(now)
    }

    /// Guard a bid mutation.
    ///
    /// # Errors
    /// Returns `RoundClosed` if no round accepts bids at `now`.
    pub fn ensure_accepting(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_bidding_open(now) {
            Ok(())
        } else {
            Err(CoursebidError::RoundClosed)
        }
    }

    /// The id of the round that may be closed at `now`. Does not change state.
    ///
    /// # Errors
    /// - `RoundClosed` if no round is open
    /// - `TooEarly` if the deadline has not passed
    pub fn closable_round(&self, now: DateTime<Utc>) -> Result<RoundId> {
        match self.state {
            RoundState::Closed => Err(CoursebidError::RoundClosed),
            RoundState::Open { deadline, .. } if now <= deadline => {
                Err(CoursebidError::TooEarly { deadline })
            }
            RoundState::Open { id, .. } => Ok(id),
        }
    }

    /// Return to CLOSED once settlement has been applied.
    pub fn mark_closed(&mut self) {
        if let Some(id) = self.state.round_id() {
            tracing::info!(round = %id, "bidding round closed");
        }
        self.state = RoundState::Closed;
    }

    /// [`Self::closable_round`] followed by [`Self::mark_closed`].
    pub fn close_round(&mut self, now: DateTime<Utc>) -> Result<RoundId> {
        let id = self.closable_round(now)?;
        self.mark_closed();
        Ok(id)
    }

    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.state.deadline()
    }

    /// Id of the most recently opened round, or `RoundId(0)` if none.
    #[must_use]
    pub fn last_round(&self) -> RoundId {
        self.last_round
    }

    #[must_use]
    pub fn max_duration_secs(&self) -> u64 {
        self.max_duration_secs
    }
}
