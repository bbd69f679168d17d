//! Credential minting and validation
//!
//! The auth service never looks inside a credential: it hands the issuer a
//! subject, a TTL, and a permission scope, and gets back an opaque string.
//! `JwtIssuer` is the stock implementation, vending RS256 bearer JWTs with
//! the channel grants embedded as a claim.

use crate::auth::scopes::ChannelGrants;
use crate::auth::PermissionScope;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("invalid signing key: {0}")]
    Key(String),

    #[error("failed to encode credential: {0}")]
    Encode(String),
}

/// Boundary to the component that mints and validates opaque credentials
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Mint a credential for `subject`, valid for `ttl`, carrying `scope`
    async fn mint(
        &self,
        subject: &str,
        ttl: Duration,
        scope: &PermissionScope,
    ) -> Result<String, IssuerError>;

    /// Report whether a previously minted credential is currently valid
    async fn validate(&self, credential: &str) -> bool;
}

/// Claims carried by a vended bearer JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity the credential was minted for
    pub sub: String,
    /// Audience: the configured messaging realm
    pub aud: String,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Credential ID
    pub jti: String,
    /// Publish/subscribe allow lists enforced by the messaging layer
    pub permissions: ChannelGrants,
}

/// RS256 bearer-JWT issuer
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: String,
}

impl JwtIssuer {
    /// Build an issuer from PEM-encoded RSA keys
    pub fn new(private_pem: &str, public_pem: &str, audience: &str) -> Result<Self, IssuerError> {
        Ok(Self {
            encoding_key: EncodingKey::from_rsa_pem(private_pem.as_bytes())
                .map_err(|e| IssuerError::Key(e.to_string()))?,
            decoding_key: DecodingKey::from_rsa_pem(public_pem.as_bytes())
                .map_err(|e| IssuerError::Key(e.to_string()))?,
            audience: audience.to_string(),
        })
    }

    /// Decode a credential, returning its claims if valid
    pub fn decode(&self, credential: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(credential, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims)
    }
}

#[async_trait]
impl TokenIssuer for JwtIssuer {
    async fn mint(
        &self,
        subject: &str,
        ttl: Duration,
        scope: &PermissionScope,
    ) -> Result<String, IssuerError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            permissions: scope.grants(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| IssuerError::Encode(e.to_string()))
    }

    async fn validate(&self, credential: &str) -> bool {
        self.decode(credential).is_some()
    }
}
