//! Client configuration and the authentication variants it can carry.

use std::fmt;

use serde::Deserialize;

use crate::utils::REDACTED;

pub const ENV_BEARER_TOKEN: &str = "WEAVIATE_AUTH_BEARER_TOKEN";
pub const ENV_USERNAME: &str = "WEAVIATE_AUTH_USERNAME";
pub const ENV_PASSWORD: &str = "WEAVIATE_AUTH_PASSWORD";
pub const ENV_CLIENT_ID: &str = "WEAVIATE_AUTH_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "WEAVIATE_AUTH_CLIENT_SECRET";
pub const ENV_SCOPE: &str = "WEAVIATE_AUTH_SCOPE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub authentication_config: Option<AuthConfig>,
}

/// Which authentication mode the client should use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthConfig {
    Bearer(BearerConfig),
    Password(PasswordConfig),
    ClientCredentials(ClientCredentialsConfig),
}

/// A pre-issued token, used verbatim.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct BearerConfig {
    pub token: String,
}

/// Resource owner password grant parameters.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordConfig {
    pub user: String,
    pub password: String,
}

/// OAuth2 client credentials grant parameters.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientCredentialsConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scope: Option<String>,
}

impl BearerConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl PasswordConfig {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl ClientCredentialsConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

impl fmt::Debug for BearerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerConfig")
            .field("token", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for PasswordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordConfig")
            .field("user", &self.user)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("scope", &self.scope)
            .finish()
    }
}

impl From<BearerConfig> for AuthConfig {
    fn from(config: BearerConfig) -> Self {
        Self::Bearer(config)
    }
}

impl From<PasswordConfig> for AuthConfig {
    fn from(config: PasswordConfig) -> Self {
        Self::Password(config)
    }
}

impl From<ClientCredentialsConfig> for AuthConfig {
    fn from(config: ClientCredentialsConfig) -> Self {
        Self::ClientCredentials(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no authentication method configured")]
    NotConfigured,
    #[error("{present} is set but {missing} is not")]
    Incomplete {
        present: &'static str,
        missing: &'static str,
    },
}

impl AuthConfig {
    /// Build the config from environment-style keys.
    ///
    /// Client credentials win over password, password wins over bearer.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|val| !val.is_empty());

        match (get(ENV_CLIENT_ID), get(ENV_CLIENT_SECRET)) {
            (Some(client_id), Some(client_secret)) => {
                return Ok(Self::ClientCredentials(ClientCredentialsConfig {
                    client_id,
                    client_secret,
                    scope: get(ENV_SCOPE),
                }))
            }
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    present: ENV_CLIENT_ID,
                    missing: ENV_CLIENT_SECRET,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    present: ENV_CLIENT_SECRET,
                    missing: ENV_CLIENT_ID,
                })
            }
            (None, None) => {}
        }

        match (get(ENV_USERNAME), get(ENV_PASSWORD)) {
            (Some(user), Some(password)) => {
                return Ok(Self::Password(PasswordConfig { user, password }))
            }
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    present: ENV_USERNAME,
                    missing: ENV_PASSWORD,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    present: ENV_PASSWORD,
                    missing: ENV_USERNAME,
                })
            }
            (None, None) => {}
        }

        get(ENV_BEARER_TOKEN)
            .map(|token| Self::Bearer(BearerConfig { token }))
            .ok_or(ConfigError::NotConfigured)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn scope_defaults_to_none() {
        let config = ClientCredentialsConfig::new("id", "secret");
        assert_eq!(config.scope, None);
        assert_eq!(
            config.with_scope("api://db/.default").scope.as_deref(),
            Some("api://db/.default")
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!(
            "{:?} {:?} {:?}",
            BearerConfig::new("tok-123"),
            PasswordConfig::new("alice", "hunter2"),
            ClientCredentialsConfig::new("id", "s3cret"),
        );
        assert!(!rendered.contains("tok-123"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("alice"));
    }

    #[test]
    fn deserialize_tagged_variants() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"authentication_config": {"method": "client_credentials", "client_id": "id", "client_secret": "secret"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.authentication_config,
            Some(ClientCredentialsConfig::new("id", "secret").into())
        );

        let config: AuthConfig =
            serde_json::from_str(r#"{"method": "password", "user": "u", "password": "p"}"#)
                .unwrap();
        assert_eq!(config, PasswordConfig::new("u", "p").into());

        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.authentication_config, None);
    }

    #[test]
    fn lookup_prefers_client_credentials() {
        let config = AuthConfig::from_lookup(lookup(&[
            (ENV_BEARER_TOKEN, "tok"),
            (ENV_USERNAME, "u"),
            (ENV_PASSWORD, "p"),
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_SCOPE, "scope-a"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            ClientCredentialsConfig::new("id", "secret")
                .with_scope("scope-a")
                .into()
        );
    }

    #[test]
    fn lookup_falls_back_to_password_then_bearer() {
        let config = AuthConfig::from_lookup(lookup(&[
            (ENV_BEARER_TOKEN, "tok"),
            (ENV_USERNAME, "u"),
            (ENV_PASSWORD, "p"),
        ]))
        .unwrap();
        assert_eq!(config, PasswordConfig::new("u", "p").into());

        let config = AuthConfig::from_lookup(lookup(&[(ENV_BEARER_TOKEN, "tok")])).unwrap();
        assert_eq!(config, BearerConfig::new("tok").into());
    }

    #[test]
    fn lookup_rejects_partial_and_empty() {
        let err = AuthConfig::from_lookup(lookup(&[(ENV_CLIENT_ID, "id")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Incomplete {
                missing: ENV_CLIENT_SECRET,
                ..
            }
        ));

        let err = AuthConfig::from_lookup(lookup(&[(ENV_PASSWORD, "p")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Incomplete {
                missing: ENV_USERNAME,
                ..
            }
        ));

        let err = AuthConfig::from_lookup(lookup(&[(ENV_BEARER_TOKEN, "")])).unwrap_err();
        assert!(matches!(err, ConfigError::NotConfigured));
    }
}
