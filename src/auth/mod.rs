//! Authorization logic.

pub mod client_credentials;
pub mod credentials;
pub mod discovery;
pub mod scope;

pub use self::credentials::{Credentials, ResolvedToken};

/// Source of access tokens for outgoing requests.
///
/// Request code is written against this trait rather than [`Credentials`],
/// so a caching layer or a fixed token can be substituted without touching it.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    type Token: Token;
    type Error: Send + Sync;

    async fn get_auth_token(&self) -> Result<Self::Token, Self::Error>;
}

pub trait Token: Send {
    fn access_token(&self) -> &str;
}

pub trait ExpiringToken: Token {
    /// Seconds the token stays valid from the moment it was issued.
    fn expires_in(&self) -> u64;
}
