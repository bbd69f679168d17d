//! Hallpass - challenge-response auth for a pub/sub messaging network
//!
//! Clients prove control of a secp256k1 key pair by signing a one-time
//! challenge; in exchange they receive a bearer token whose embedded
//! permissions confine them to channels namespaced by their own address.

pub mod auth;
pub mod config;
pub mod issuer;
pub mod subjects;

pub use auth::{
    AdminSecret, AuthError, Challenge, ChannelGrants, MessagingAuthService, NonceRegistry,
    PermissionScope,
};
pub use config::AuthConfig;
pub use issuer::{JwtIssuer, TokenIssuer};
pub use subjects::{Subject, SubjectPattern};
