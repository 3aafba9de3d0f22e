//! Resolve access tokens for whichever [`AuthConfig`] the client was given.

use tracing::{debug, info};

use super::{client_credentials, discovery, scope::MissingScope};
use crate::{
    config::{AuthConfig, ClientCredentialsConfig},
    connection::Connection,
};

/// Expiry reported for configurations that do not exchange a token.
const UNEXCHANGED_EXPIRES_IN: u64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("discovery: {0}")]
    Discovery(#[from] discovery::Error),
    #[error(transparent)]
    MissingScope(#[from] MissingScope),
    #[error("token exchange: {0}")]
    TokenExchange(#[from] client_credentials::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub access_token: String,
    pub expires_in: u64,
}

impl ResolvedToken {
    fn unexchanged() -> Self {
        Self {
            access_token: String::new(),
            expires_in: UNEXCHANGED_EXPIRES_IN,
        }
    }
}

impl From<client_credentials::AuthResponse> for ResolvedToken {
    fn from(auth: client_credentials::AuthResponse) -> Self {
        let client_credentials::AuthResponse {
            access_token,
            expires_in,
        } = auth;
        Self {
            access_token,
            expires_in,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    config: AuthConfig,
    client: reqwest::Client,
    open_id_config_url: String,
    token_endpoint: String,
}

impl Credentials {
    /// Discover the token endpoint behind `open_id_config_url`.
    ///
    /// The discovery request is made for every config variant, so a broken
    /// discovery document fails construction even for bearer tokens.
    pub async fn new(
        config: AuthConfig,
        open_id_config_url: impl Into<String>,
        connection: &Connection,
    ) -> Result<Self, Error> {
        let open_id_config_url = open_id_config_url.into();
        let token_endpoint =
            discovery::fetch_token_endpoint(connection, &open_id_config_url).await?;

        info!(
            message = "Discovered token endpoint",
            open_id_config_url = %open_id_config_url,
            token_endpoint = %token_endpoint,
        );

        Ok(Self {
            config,
            client: connection.client().clone(),
            open_id_config_url,
            token_endpoint,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn open_id_config_url(&self) -> &str {
        &self.open_id_config_url
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Resolve a token for the configured authentication method.
    ///
    /// Bearer and password configs do not exchange anything and yield an
    /// empty token that expires in one second.
    pub async fn get_auth_token(&self) -> Result<ResolvedToken, Error> {
        match &self.config {
            AuthConfig::Bearer(_) => Ok(ResolvedToken::unexchanged()),
            AuthConfig::Password(_) => Ok(ResolvedToken::unexchanged()),
            AuthConfig::ClientCredentials(config) => {
                let token: ResolvedToken = self.grant(config)?.perform().await?.into();
                debug!(message = "Got new token", expires_in = token.expires_in);
                Ok(token)
            }
        }
    }

    fn grant(
        &self,
        config: &ClientCredentialsConfig,
    ) -> Result<client_credentials::ClientCredentials, MissingScope> {
        client_credentials::ClientCredentials::from_config(
            self.client.clone(),
            config,
            &self.token_endpoint,
        )
    }
}

#[async_trait::async_trait]
impl super::TokenProvider for Credentials {
    type Token = ResolvedToken;
    type Error = Error;

    async fn get_auth_token(&self) -> Result<Self::Token, Self::Error> {
        Credentials::get_auth_token(self).await
    }
}

impl super::Token for ResolvedToken {
    fn access_token(&self) -> &str {
        self.access_token.as_str()
    }
}

impl super::ExpiringToken for ResolvedToken {
    fn expires_in(&self) -> u64 {
        self.expires_in
    }
}
