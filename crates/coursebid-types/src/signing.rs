//! Signed actions accepted without a prior handshake.
//!
//! Each action defines a canonical signing payload. Payloads are
//! domain-separated per action and bind the [`SystemId`] of the engine
//! instance, so a signature is valid for exactly one action on exactly one
//! instance. Transfers additionally bind a one-time nonce.
//!
//! Ed25519 cannot recover a signer from a signature, so every action names
//! its signer explicitly and verification checks against that key.

use serde::{Deserialize, Serialize};

use crate::{Identity, SystemId, constants};

/// An admin's signed approval to enroll a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentAuthorization {
    /// The admin who signed.
    pub admin: Identity,
    /// The student being enrolled.
    pub student: Identity,
    /// Most credits the student may purchase.
    pub credit_cap: u64,
    /// Ed25519 signature over [`Self::signing_payload`].
    pub signature: Vec<u8>,
}

impl EnrollmentAuthorization {
    /// Format: `"coursebid:enroll:v1:" || system_id || admin || student || credit_cap`
    #[must_use]
    pub fn signing_payload(&self, system_id: &SystemId) -> Vec<u8> {
        enrollment_payload(system_id, &self.admin, &self.student, self.credit_cap)
    }
}

/// Canonical enrollment payload, shared by signer and verifier.
#[must_use]
pub fn enrollment_payload(
    system_id: &SystemId,
    admin: &Identity,
    student: &Identity,
    credit_cap: u64,
) -> Vec<u8> {
    let mut payload = Vec::with_capacity(128);
    payload.extend_from_slice(constants::ENROLL_DOMAIN);
    payload.extend_from_slice(system_id.as_bytes());
    payload.extend_from_slice(admin.as_bytes());
    payload.extend_from_slice(student.as_bytes());
    payload.extend_from_slice(&credit_cap.to_le_bytes());
    payload
}

/// A sender's signed order to move credits to another student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAuthorization {
    pub from: Identity,
    pub to: Identity,
    pub amount: u64,
    /// One-time per sender.
    pub nonce: u64,
    /// Ed25519 signature by `from` over [`Self::signing_payload`].
    pub signature: Vec<u8>,
}

impl TransferAuthorization {
    /// Format: `"coursebid:transfer:v1:" || system_id || from || to || amount || nonce`
    #[must_use]
    pub fn signing_payload(&self, system_id: &SystemId) -> Vec<u8> {
        transfer_payload(system_id, &self.from, &self.to, self.amount, self.nonce)
    }
}

/// Canonical transfer payload, shared by signer and verifier.
#[must_use]
pub fn transfer_payload(
    system_id: &SystemId,
    from: &Identity,
    to: &Identity,
    amount: u64,
    nonce: u64,
) -> Vec<u8> {
    let mut payload = Vec::with_capacity(144);
    payload.extend_from_slice(constants::TRANSFER_DOMAIN);
    payload.extend_from_slice(system_id.as_bytes());
    payload.extend_from_slice(from.as_bytes());
    payload.extend_from_slice(to.as_bytes());
    payload.extend_from_slice(&amount.to_le_bytes());
    payload.extend_from_slice(&nonce.to_le_bytes());
    payload
}
