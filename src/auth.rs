//! Access token providers.
//!
//! The list controller never stores credentials itself. It asks a
//! [`CredentialProvider`] for the current token right before each call and
//! treats `None` as an unauthenticated failure without touching the network.

use std::fmt;

use secrecy::SecretString;

/// Synchronous, read-only source of the current access token.
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> Option<SecretString>;
}

/// A fixed token (or the lack of one).
#[derive(Clone, Default)]
pub struct StaticCredentials {
    token: Option<SecretString>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self {
            token: (!token.is_empty()).then(|| SecretString::from(token)),
        }
    }

    /// A provider that never yields a token.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self) -> Option<SecretString> {
        self.token.clone()
    }
}
