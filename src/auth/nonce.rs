//! One-time challenge issuance and storage
//!
//! The registry keeps at most one live challenge per identity. Issuing a new
//! challenge silently replaces the previous one, which makes any signature
//! over the old value unredeemable.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;

/// Hex-encoded challenge value length in random bytes
const NONCE_BYTES: usize = 32;

/// A challenge issued to a single identity
#[derive(Debug, Clone)]
pub struct Challenge {
    /// Identity the challenge was issued to
    pub identity: String,
    /// Random one-time value, `0x`-prefixed hex
    pub value: String,
    /// Absolute expiry timestamp
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    /// Check whether the challenge's validity window has elapsed
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// In-memory store of per-identity challenges
///
/// Redemption does not consume a challenge: a stored value stays redeemable
/// until its TTL elapses or a fresh `issue` overwrites it.
pub struct NonceRegistry {
    entries: DashMap<String, Challenge>,
    ttl: Duration,
}

impl NonceRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh challenge for an identity, replacing any existing one
    pub fn issue(&self, identity: &str) -> Challenge {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        let challenge = Challenge {
            identity: identity.to_string(),
            value: format!("0x{}", hex::encode(bytes)),
            expires_at: Utc::now() + self.ttl,
        };

        self.entries
            .insert(identity.to_string(), challenge.clone());
        challenge
    }

    /// Read the currently stored challenge for an identity without consuming it
    pub fn peek(&self, identity: &str) -> Option<Challenge> {
        self.entries.get(identity).map(|c| c.clone())
    }

    /// Number of identities with a stored challenge
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_format() {
        let registry = NonceRegistry::new(Duration::hours(24));
        let challenge = registry.issue("0xabc");

        assert_eq!(challenge.identity, "0xabc");
        assert!(challenge.value.starts_with("0x"));
        assert_eq!(challenge.value.len(), 2 + NONCE_BYTES * 2);
        assert!(!challenge.is_expired());
    }

    #[test]
    fn test_issue_replaces_previous() {
        let registry = NonceRegistry::new(Duration::hours(24));

        let first = registry.issue("0xabc");
        let second = registry.issue("0xabc");

        assert_ne!(first.value, second.value);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.peek("0xabc").unwrap().value, second.value);
    }

    #[test]
    fn test_peek_unknown_identity() {
        let registry = NonceRegistry::new(Duration::hours(24));
        assert!(registry.is_empty());
        assert!(registry.peek("0xnobody").is_none());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let registry = NonceRegistry::new(Duration::hours(24));
        let challenge = registry.issue("0xabc");

        assert_eq!(registry.peek("0xabc").unwrap().value, challenge.value);
        assert_eq!(registry.peek("0xabc").unwrap().value, challenge.value);
    }

    #[test]
    fn test_negative_ttl_expires_immediately() {
        let registry = NonceRegistry::new(Duration::seconds(-120));
        let challenge = registry.issue("0xabc");

        assert!(challenge.is_expired());
        // Still stored: expiry is checked at redemption time, not eagerly
        assert!(registry.peek("0xabc").is_some());
    }
}
