//! Authentication core
//!
//! Flow:
//! - `request_challenge`: a fresh one-time nonce is stored per identity
//! - the client signs the versioned message prefix plus the nonce
//! - `redeem_challenge`: the signature must recover to the claimed identity
//!   before the TTL elapses; a configured admin secret bypasses the whole
//!   flow and yields an unrestricted credential
//!
//! Redemption does not delete the stored nonce, so a signed challenge stays
//! replayable until expiry or overwrite.

mod nonce;
pub mod scopes;
pub mod signature;
mod service;

pub use nonce::{Challenge, NonceRegistry};
pub use scopes::{AllowList, ChannelGrants, PermissionScope};
pub use service::{AdminSecret, AuthError, MessagingAuthService, MESSAGE_PREFIX};
pub use signature::SignatureError;
