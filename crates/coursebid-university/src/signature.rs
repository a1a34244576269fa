//! Ed25519 signing and verification for signed actions.
//!
//! An [`Identity`] is the signer's raw public key, so verification needs
//! nothing beyond the action itself.

use coursebid_types::{
    CoursebidError, EnrollmentAuthorization, Identity, Result, SystemId, TransferAuthorization,
    enrollment_payload, transfer_payload,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// The identity a signing key acts as.
#[must_use]
pub fn identity_of(key: &SigningKey) -> Identity {
    Identity::from_pubkey(key.verifying_key().to_bytes())
}

/// Sign `message`, returning the 64 signature bytes.
#[must_use]
pub fn sign(key: &SigningKey, message: &[u8]) -> Vec<u8> {
    key.sign(message).to_bytes().to_vec()
}

/// Check `signature` over `message` against `signer`'s key.
///
/// # Errors
/// Returns `InvalidSignature` for a malformed key, a malformed signature,
/// or a signature that does not verify.
pub fn verify_signature(message: &[u8], signature: &[u8], signer: &Identity) -> Result<()> {
    let key = VerifyingKey::from_bytes(signer.as_bytes()).map_err(|e| {
        CoursebidError::InvalidSignature {
            reason: format!("bad public key {signer}: {e}"),
        }
    })?;
    let sig = Signature::from_slice(signature).map_err(|e| CoursebidError::InvalidSignature {
        reason: format!("malformed signature: {e}"),
    })?;
    key.verify(message, &sig)
        .map_err(|e| CoursebidError::InvalidSignature {
            reason: format!("verification failed for {signer}: {e}"),
        })
}

/// Build an enrollment signed by `admin_key`.
#[must_use]
pub fn sign_enrollment(
    admin_key: &SigningKey,
    system_id: &SystemId,
    student: Identity,
    credit_cap: u64,
) -> EnrollmentAuthorization {
    let admin = identity_of(admin_key);
    let payload = enrollment_payload(system_id, &admin, &student, credit_cap);
    EnrollmentAuthorization {
        admin,
        student,
        credit_cap,
        signature: sign(admin_key, &payload),
    }
}

/// Build a transfer signed by the sender's key.
#[must_use]
pub fn sign_transfer(
    from_key: &SigningKey,
    system_id: &SystemId,
    to: Identity,
    amount: u64,
    nonce: u64,
) -> TransferAuthorization {
    let from = identity_of(from_key);
    let payload = transfer_payload(system_id, &from, &to, amount, nonce);
    TransferAuthorization {
        from,
        to,
        amount,
        nonce,
        signature: sign(from_key, &payload),
    }
}

/// Verify an enrollment against its named admin.
pub fn verify_enrollment(auth: &EnrollmentAuthorization, system_id: &SystemId) -> Result<()> {
    verify_signature(&auth.signing_payload(system_id), &auth.signature, &auth.admin)
}

/// Verify a transfer against its named sender.
pub fn verify_transfer(auth: &TransferAuthorization, system_id: &SystemId) -> Result<()> {
    verify_signature(&auth.signing_payload(system_id), &auth.signature, &auth.from)
}
