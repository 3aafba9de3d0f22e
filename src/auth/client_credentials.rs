//! Authorize using the client credentials flow.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use super::scope::{self, MissingScope};
use crate::{config::ClientCredentialsConfig, utils::REDACTED};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("form encoding: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("token endpoint rejected the request with {status_code} status code{}", describe(.error, .error_description))]
    Rejected {
        status_code: u16,
        error: Option<String>,
        error_description: Option<String>,
    },
}

fn describe(error: &Option<String>, description: &Option<String>) -> String {
    match (error, description) {
        (Some(error), Some(description)) => format!(": {}: {}", error, description),
        (Some(error), None) => format!(": {}", error),
        _ => String::new(),
    }
}

/// How the client authenticates itself at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEndpointAuthMethod {
    /// Credentials go in the form body.
    ClientSecretPost,
    /// Credentials go in an HTTP Basic `Authorization` header.
    ClientSecretBasic,
}

impl TokenEndpointAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientSecretPost => "client_secret_post",
            Self::ClientSecretBasic => "client_secret_basic",
        }
    }
}

#[derive(Clone)]
pub struct ClientCredentials {
    pub client: reqwest::Client,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub token_endpoint: String,
    pub auth_method: TokenEndpointAuthMethod,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("scope", &self.scope)
            .field("token_endpoint", &self.token_endpoint)
            .field("auth_method", &self.auth_method)
            .finish()
    }
}

impl ClientCredentials {
    /// Prepare the grant for `config`, resolving its scope against `token_endpoint`.
    pub fn from_config(
        client: reqwest::Client,
        config: &ClientCredentialsConfig,
        token_endpoint: &str,
    ) -> Result<Self, MissingScope> {
        let scope = scope::resolve(config.scope.as_deref(), token_endpoint)?;
        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope,
            token_endpoint: token_endpoint.to_owned(),
            auth_method: TokenEndpointAuthMethod::ClientSecretPost,
        })
    }

    /// Form parameters sent to the token endpoint.
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![("grant_type", "client_credentials")];
        if self.auth_method == TokenEndpointAuthMethod::ClientSecretPost {
            params.push(("client_id", self.client_id.as_str()));
            params.push(("client_secret", self.client_secret.as_str()));
        }
        params.push(("scope", self.scope.as_str()));
        params
    }

    /// Perform the client credentials flow.
    pub async fn perform(&self) -> Result<AuthResponse, Error> {
        let params = serde_urlencoded::to_string(self.form_params())?;

        let builder = self
            .client
            .post(&self.token_endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json");
        let builder = match self.auth_method {
            TokenEndpointAuthMethod::ClientSecretPost => builder,
            TokenEndpointAuthMethod::ClientSecretBasic => {
                builder.basic_auth(&self.client_id, Some(&self.client_secret))
            }
        };
        let req = builder.body(params).build()?;

        debug!(
            message = "Requesting token",
            token_endpoint = %self.token_endpoint,
            auth_method = self.auth_method.as_str(),
        );

        let res = self.client.execute(req).await?;
        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!(message = "Could not read rejection body", error = %err);
                    String::new()
                }
            };
            let oauth_error = serde_json::from_str::<ErrorResponse>(&body).ok();
            let (error, error_description) = oauth_error
                .map(|err| (Some(err.error), err.error_description))
                .unwrap_or((None, None));
            warn!(
                message = "Token endpoint rejected the request",
                status_code = status.as_u16(),
                error = ?error,
            );
            return Err(Error::Rejected {
                status_code: status.as_u16(),
                error,
                error_description,
            });
        }

        let login_response = res.json().await?;
        Ok(login_response)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// The requested access token.
    pub access_token: String,
    /// The amount of time that an access token is valid (in seconds).
    #[serde(deserialize_with = "seconds")]
    pub expires_in: u64,
}

/// Accept `expires_in` as a number or as a numeric string (Azure AD v1 sends `"3599"`).
fn seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(secs) => Ok(secs),
        Seconds::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// RFC 6749 section 5.2 error body.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    error_description: Option<String>,
}
