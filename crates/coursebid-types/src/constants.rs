//! System-wide constants for the coursebid engine.

/// Maximum length of a course code.
pub const MAX_COURSE_CODE_LEN: usize = 32;

/// Default upper bound for a bidding round: 14 days.
pub const DEFAULT_MAX_ROUND_DURATION_SECS: u64 = 14 * 24 * 60 * 60;

/// Default maximum number of credits a claimant may ever purchase.
pub const DEFAULT_MAX_CREDITS_PER_CLAIMANT: u64 = 10_000;

/// Default number of transfer nonces remembered per sender.
pub const DEFAULT_NONCE_CAPACITY_PER_CLAIMANT: usize = 10_000;

/// Domain separator for enrollment signatures.
pub const ENROLL_DOMAIN: &[u8] = b"coursebid:enroll:v1:";

/// Domain separator for peer transfer signatures.
pub const TRANSFER_DOMAIN: &[u8] = b"coursebid:transfer:v1:";

/// Domain separator for award identifiers.
pub const AWARD_ID_DOMAIN: &[u8] = b"coursebid:award_id:v1:";

/// Domain separator for the settlement award root.
pub const AWARD_ROOT_DOMAIN: &[u8] = b"coursebid:award_root:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "coursebid";
