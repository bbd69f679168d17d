//! Service configuration
//!
//! Everything the auth service needs at construction: the messaging realm
//! used as the credential audience, the issuer's RSA keypair, the admin
//! secret, and the challenge/credential TTL.

use crate::auth::{AdminSecret, MessagingAuthService};
use crate::issuer::{IssuerError, JwtIssuer};
use chrono::Duration;
use std::fmt;
use tracing::info;

/// Default challenge/credential TTL: one day
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    /// Messaging realm; used as the audience of vended credentials
    pub messaging_url: String,
    /// PEM-encoded RSA private key for signing credentials
    pub jwt_private_key: String,
    /// PEM-encoded RSA public key for validating credentials
    pub jwt_public_key: String,
    /// Shared secret granting unrestricted credentials
    pub admin_secret: String,
    /// Validity window for challenges and credentials
    pub nonce_ttl: Duration,
}

impl AuthConfig {
    /// Load configuration from the environment
    ///
    /// Key material comes from `HALLPASS_JWT_PRIVATE_KEY` /
    /// `HALLPASS_JWT_PUBLIC_KEY` (inline PEM, `\n`-escaped) or the `_PATH`
    /// variants pointing at PEM files.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            messaging_url: std::env::var("HALLPASS_MESSAGING_URL").ok()?,
            jwt_private_key: key_from_env("HALLPASS_JWT_PRIVATE_KEY")?,
            jwt_public_key: key_from_env("HALLPASS_JWT_PUBLIC_KEY")?,
            admin_secret: std::env::var("HALLPASS_ADMIN_SECRET").ok()?,
            nonce_ttl: Duration::seconds(
                std::env::var("HALLPASS_NONCE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TTL_SECS),
            ),
        })
    }

    /// Build the auth service this configuration describes
    pub fn build_service(&self) -> Result<MessagingAuthService<JwtIssuer>, IssuerError> {
        info!(config = ?self, "building messaging auth service");

        let issuer = JwtIssuer::new(
            &self.jwt_private_key,
            &self.jwt_public_key,
            &self.messaging_url,
        )?;

        Ok(MessagingAuthService::new(
            issuer,
            AdminSecret::new(self.admin_secret.clone()),
            self.nonce_ttl,
        ))
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("messaging_url", &self.messaging_url)
            .field("jwt_private_key", &"[REDACTED]")
            .field("jwt_public_key", &"[REDACTED]")
            .field("admin_secret", &"[REDACTED]")
            .field("nonce_ttl", &self.nonce_ttl)
            .finish()
    }
}

/// Read a PEM key from `<var>` (inline, `\n`-escaped) or `<var>_PATH` (file)
fn key_from_env(var: &str) -> Option<String> {
    if let Ok(path) = std::env::var(format!("{var}_PATH")) {
        return std::fs::read_to_string(path).ok();
    }
    std::env::var(var).ok().map(|pem| pem.replace("\\n", "\n"))
}
