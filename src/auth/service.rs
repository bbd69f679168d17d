//! Challenge-response orchestration
//!
//! `MessagingAuthService` ties the pieces together: it hands out one-time
//! challenges, verifies that redemption signatures recover to the claimed
//! identity, and asks the token issuer to mint a scoped credential.

use crate::auth::nonce::NonceRegistry;
use crate::auth::scopes::PermissionScope;
use crate::auth::signature;
use crate::issuer::TokenIssuer;
use chrono::Duration;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Prefix of every message a client signs, concatenated with the challenge
/// value. Part of the signing contract shared with clients out-of-band:
/// changing it is a protocol version bump.
pub const MESSAGE_PREFIX: &str = "hallpass auth v1. Sign this message to prove you control this \
account; signing costs nothing and authorizes nothing beyond messaging. One-time challenge: ";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no active challenge for {0}; request one first")]
    ChallengeNotFound(String),

    #[error("signature does not prove control of {identity}: {detail}")]
    SignatureMismatch { identity: String, detail: String },

    #[error("challenge expired for {0}; request a fresh one")]
    ChallengeExpired(String),

    #[error("token issuer failure: {0}")]
    Issuer(String),
}

/// Shared secret that bypasses the challenge flow entirely
#[derive(Clone)]
pub struct AdminSecret {
    secret: String,
}

impl AdminSecret {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var("HALLPASS_ADMIN_SECRET").ok().map(Self::new)
    }

    pub fn matches(&self, candidate: &str) -> bool {
        // Constant-time comparison to prevent timing attacks
        if candidate.len() != self.secret.len() {
            return false;
        }

        let mut result = 0u8;
        for (a, b) in candidate.bytes().zip(self.secret.bytes()) {
            result |= a ^ b;
        }
        result == 0
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdminSecret([REDACTED])")
    }
}

/// Issues challenges and redeems them for scoped credentials
pub struct MessagingAuthService<I: TokenIssuer> {
    nonces: NonceRegistry,
    issuer: I,
    admin_secret: AdminSecret,
    credential_ttl: Duration,
}

impl<I: TokenIssuer> MessagingAuthService<I> {
    /// `ttl` bounds both the challenge validity window and the minted
    /// credential lifetime.
    pub fn new(issuer: I, admin_secret: AdminSecret, ttl: Duration) -> Self {
        info!(ttl_secs = ttl.num_seconds(), "created messaging auth service");
        Self {
            nonces: NonceRegistry::new(ttl),
            issuer,
            admin_secret,
            credential_ttl: ttl,
        }
    }

    /// Issue a one-time challenge for an identity
    ///
    /// Any previously issued challenge for the same identity becomes
    /// permanently unredeemable.
    pub fn request_challenge(&self, identity: &str) -> String {
        let challenge = self.nonces.issue(identity);
        info!(
            identity,
            expires_at = %challenge.expires_at,
            "issued challenge"
        );
        challenge.value
    }

    /// Redeem a signed challenge for a credential
    ///
    /// A matching `admin_secret` skips verification and yields an
    /// unrestricted credential; a non-matching one falls through to the
    /// normal challenge flow rather than failing.
    pub async fn redeem_challenge(
        &self,
        identity: &str,
        signed_challenge: &str,
        admin_secret: Option<&str>,
    ) -> Result<String, AuthError> {
        if let Some(candidate) = admin_secret {
            if self.admin_secret.matches(candidate) {
                warn!(identity, "issuing admin-scoped credential");
                return self.mint(identity, PermissionScope::Unrestricted).await;
            }
        }

        let challenge = self
            .nonces
            .peek(identity)
            .ok_or_else(|| AuthError::ChallengeNotFound(identity.to_string()))?;

        let message = format!("{MESSAGE_PREFIX}{}", challenge.value);
        let recovered =
            signature::recover_signer(&message, signed_challenge).map_err(|e| {
                AuthError::SignatureMismatch {
                    identity: identity.to_string(),
                    detail: e.to_string(),
                }
            })?;

        if recovered != identity {
            return Err(AuthError::SignatureMismatch {
                identity: identity.to_string(),
                detail: format!("recovered {recovered}"),
            });
        }

        if challenge.is_expired() {
            return Err(AuthError::ChallengeExpired(identity.to_string()));
        }

        self.mint(identity, PermissionScope::restricted(identity))
            .await
    }

    /// Validate a previously vended credential
    pub async fn verify_credential(&self, credential: &str) -> bool {
        self.issuer.validate(credential).await
    }

    async fn mint(&self, identity: &str, scope: PermissionScope) -> Result<String, AuthError> {
        let credential = self
            .issuer
            .mint(identity, self.credential_ttl, &scope)
            .await
            .map_err(|e| AuthError::Issuer(e.to_string()))?;

        info!(
            identity,
            unrestricted = scope.is_unrestricted(),
            "vended credential"
        );
        Ok(credential)
    }
}
