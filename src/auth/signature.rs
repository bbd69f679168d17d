//! secp256k1 signature recovery for account-style identities
//!
//! Clients sign challenges with an Ethereum-style personal message envelope,
//! so any stock wallet can produce a valid proof. Recovery yields the
//! signer's address, rendered in EIP-55 checksum form for a byte-for-byte
//! comparison against the claimed identity.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Envelope prepended to signed payloads by `personal_sign`
const PERSONAL_MESSAGE_TAG: &str = "\x19Ethereum Signed Message:\n";

/// Expected signature wire length: r (32) || s (32) || v (1)
const SIGNATURE_BYTES: usize = 65;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature is not valid hex: {0}")]
    InvalidHex(String),

    #[error("signature must be {SIGNATURE_BYTES} bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("malformed signature scalars")]
    InvalidFormat,

    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Hash a message inside the personal-sign envelope
pub fn hash_personal_message(message: &str) -> [u8; 32] {
    let mut data = Vec::with_capacity(
        PERSONAL_MESSAGE_TAG.len() + 20 + message.len(),
    );
    data.extend_from_slice(PERSONAL_MESSAGE_TAG.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message.as_bytes());
    keccak256(&data)
}

/// Recover the checksummed address that signed `message`
///
/// `signature` is 65 hex-encoded bytes (`0x` prefix optional): the r and s
/// scalars followed by a recovery byte v in {0, 1, 27, 28}.
pub fn recover_signer(message: &str, signature: &str) -> Result<String, SignatureError> {
    let raw = hex::decode(signature.strip_prefix("0x").unwrap_or(signature))
        .map_err(|e| SignatureError::InvalidHex(e.to_string()))?;

    if raw.len() != SIGNATURE_BYTES {
        return Err(SignatureError::InvalidLength(raw.len()));
    }

    let sig = Signature::from_slice(&raw[..64]).map_err(|_| SignatureError::InvalidFormat)?;
    let recovery_id = parse_recovery_id(raw[64])?;

    let digest = hash_personal_message(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&key))
}

/// Derive the checksummed address for a public key
pub fn address_from_pubkey(key: &VerifyingKey) -> String {
    let encoded = key.to_encoded_point(false);
    // Keccak over the raw point, skipping the 0x04 prefix byte
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    checksum_address(&address)
}

/// Render an address in EIP-55 mixed-case checksum form
fn checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    pub fn generate_keypair() -> (SigningKey, String) {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(key.verifying_key());
        (key, address)
    }

    /// Sign a message the way a wallet's `personal_sign` would
    pub fn sign_message(key: &SigningKey, message: &str) -> String {
        let digest = hash_personal_message(message);
        let (sig, recovery_id) = key
            .sign_prehash_recoverable(&digest)
            .expect("signing failed");

        let mut raw = sig.to_bytes().to_vec();
        raw.push(recovery_id.to_byte() + 27);
        format!("0x{}", hex::encode(raw))
    }
}
