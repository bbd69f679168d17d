//! Permission scopes embedded in minted credentials

use serde::{Deserialize, Serialize};

/// What a credential holder may do on the bus
///
/// The variant is resolved at redemption time and baked into the credential
/// by the token issuer; nothing else consults it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionScope {
    /// Publish only on subjects namespaced by the holder's own identity
    /// (plus the reply inbox); subscribe anywhere.
    Restricted { identity: String },
    /// Publish and subscribe anywhere.
    Unrestricted,
}

/// Issuer-facing allow lists, in the shape the messaging layer consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGrants {
    pub publish: AllowList,
    pub subscribe: AllowList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    pub allow: Vec<String>,
}

impl PermissionScope {
    pub fn restricted(identity: impl Into<String>) -> Self {
        Self::Restricted {
            identity: identity.into(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Expand the scope into concrete allow lists
    pub fn grants(&self) -> ChannelGrants {
        match self {
            // Publish as "to.from.subject"; replies go through _INBOX
            Self::Restricted { identity } => ChannelGrants {
                publish: AllowList {
                    allow: vec![format!("*.{identity}.>"), "_INBOX.>".to_string()],
                },
                subscribe: AllowList {
                    allow: vec![">".to_string()],
                },
            },
            Self::Unrestricted => ChannelGrants {
                publish: AllowList {
                    allow: vec![">".to_string()],
                },
                subscribe: AllowList {
                    allow: vec![">".to_string()],
                },
            },
        }
    }
}
