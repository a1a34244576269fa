//! Identifiers used throughout coursebid.
//!
//! Participants are identified by their raw ed25519 public key, so an
//! identity doubles as the key that verifies its signed actions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoursebidError, Result, constants};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A participant (chief, admin, lecturer or student).
/// This is the raw ed25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Identity(pub [u8; 32]);

impl Identity {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_hex32(s).map(Self)
    }
}

/// Random identity for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Identity {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// SystemId
// ---------------------------------------------------------------------------

/// Identity of one deployed engine instance.
///
/// Bound into every signed payload so a signature made for one instance
/// cannot be replayed against another. Serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemId(pub [u8; 32]);

impl SystemId {
    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_hex32(s).map(Self)
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Default for SystemId {
    fn default() -> Self {
        Self([0u8; 32])
    }
}

impl TryFrom<String> for SystemId {
    type Error = CoursebidError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<SystemId> for String {
    fn from(id: SystemId) -> Self {
        id.to_hex()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sys:{}", hex::encode(&self.0[..8]))
    }
}

fn decode_hex32(s: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(s.trim()).map_err(|e| CoursebidError::Configuration(e.to_string()))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        CoursebidError::Configuration(format!("expected 32 bytes, got {}", b.len()))
    })
}

// ---------------------------------------------------------------------------
// CourseCode
// ---------------------------------------------------------------------------

/// Unique course code (e.g. `CS101`).
///
/// Validated on construction: non-empty, at most
/// [`constants::MAX_COURSE_CODE_LEN`] characters, ASCII alphanumerics plus
/// `-`, `_` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.is_empty() {
            return Err(CoursebidError::InvalidCourseCode {
                reason: "empty".to_string(),
            });
        }
        if code.len() > constants::MAX_COURSE_CODE_LEN {
            return Err(CoursebidError::InvalidCourseCode {
                reason: format!(
                    "{} chars, max {}",
                    code.len(),
                    constants::MAX_COURSE_CODE_LEN
                ),
            });
        }
        if let Some(bad) = code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(CoursebidError::InvalidCourseCode {
                reason: format!("illegal character {bad:?}"),
            });
        }
        Ok(Self(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CoursebidError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RoundId
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier for a bidding round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct RoundId(pub u64);

impl RoundId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AwardId
// ---------------------------------------------------------------------------

/// Identifier of a settled seat award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AwardId(pub Uuid);

impl AwardId {
    /// Deterministic `AwardId` from round, course and claimant.
    ///
    /// Every replica settling the same round derives the same id.
    #[must_use]
    pub fn deterministic(round_id: RoundId, course: &CourseCode, claimant: &Identity) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(constants::AWARD_ID_DOMAIN);
        hasher.update(round_id.0.to_le_bytes());
        hasher.update((course.as_str().len() as u64).to_le_bytes());
        hasher.update(course.as_str().as_bytes());
        hasher.update(claimant.0);
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        Self(Uuid::from_bytes(bytes))
    }
}

impl fmt::Display for AwardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "award:{}", self.0)
    }
}
