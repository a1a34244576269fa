//! One-time nonces for signed peer transfers.
//!
//! A captured transfer signature is only useful once: the nonce it binds is
//! remembered per sender, and a second submission is rejected as a replay.
//! Each sender's nonce set is bounded; when it is full the sender cannot
//! transfer again until the set is cleared.

use std::collections::{HashMap, HashSet};

use coursebid_types::{CoursebidError, Identity, Result};

/// Tracks used transfer nonces per sender.
#[derive(Debug)]
pub struct NonceTracker {
    used: HashMap<Identity, HashSet<u64>>,
    max_per_sender: usize,
}

impl NonceTracker {
    #[must_use]
    pub fn new(max_per_sender: usize) -> Self {
        Self {
            used: HashMap::new(),
            max_per_sender,
        }
    }

    /// Check a nonce without recording it.
    ///
    /// # Errors
    /// - `ReplayedNonce` if already used by `sender`
    /// - `NonceCapacityExhausted` if `sender` has no room left
    pub fn check(&self, sender: &Identity, nonce: u64) -> Result<()> {
        let Some(nonces) = self.used.get(sender) else {
            return Ok(());
        };
        if nonces.contains(&nonce) {
            return Err(CoursebidError::ReplayedNonce {
                sender: *sender,
                nonce,
            });
        }
        if nonces.len() >= self.max_per_sender {
            return Err(CoursebidError::NonceCapacityExhausted(*sender));
        }
        Ok(())
    }

    /// Record a nonce previously accepted by [`Self::check`].
    pub fn record(&mut self, sender: Identity, nonce: u64) {
        self.used.entry(sender).or_default().insert(nonce);
    }

    /// Check and record in one step.
    pub fn check_and_record(&mut self, sender: Identity, nonce: u64) -> Result<()> {
        self.check(&sender, nonce)?;
        self.record(sender, nonce);
        Ok(())
    }

    #[must_use]
    pub fn is_used(&self, sender: &Identity, nonce: u64) -> bool {
        self.used.get(sender).is_some_and(|n| n.contains(&nonce))
    }

    /// Total nonces tracked across all senders.
    #[must_use]
    pub fn total_nonces(&self) -> usize {
        self.used.values().map(HashSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_nonce_allowed() {
        let mut tracker = NonceTracker::new(10);
        let sender = Identity::random();
        tracker.check_and_record(sender, 1).unwrap();
        assert!(tracker.is_used(&sender, 1));
        assert_eq!(tracker.total_nonces(), 1);
    }

    #[test]
    fn replay_blocked() {
        let mut tracker = NonceTracker::new(10);
        let sender = Identity::random();
        tracker.check_and_record(sender, 7).unwrap();
        let err = tracker.check_and_record(sender, 7).unwrap_err();
        assert!(matches!(err, CoursebidError::ReplayedNonce { nonce: 7, .. }));
    }

    #[test]
    fn senders_independent() {
        let mut tracker = NonceTracker::new(10);
        let (a, b) = (Identity::random(), Identity::random());
        tracker.check_and_record(a, 1).unwrap();
        tracker.check_and_record(b, 1).unwrap();
        assert_eq!(tracker.total_nonces(), 2);
    }

    #[test]
    fn check_does_not_record() {
        let tracker = NonceTracker::new(10);
        let sender = Identity::random();
        tracker.check(&sender, 3).unwrap();
        assert!(!tracker.is_used(&sender, 3));
    }

    #[test]
    fn capacity_enforced() {
        let mut tracker = NonceTracker::new(2);
        let sender = Identity::random();
        tracker.check_and_record(sender, 1).unwrap();
        tracker.check_and_record(sender, 2).unwrap();
        let err = tracker.check_and_record(sender, 3).unwrap_err();
        assert!(matches!(err, CoursebidError::NonceCapacityExhausted(_)));
    }
}
