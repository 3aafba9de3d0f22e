//! OpenID Connect discovery.

use serde_json::Value;
use tracing::debug;

use crate::{
    connection::Connection,
    utils::{check_status, ServerError},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("server: {0}")]
    Server(#[from] ServerError),
    #[error("discovery document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("discovery document has no token_endpoint")]
    MissingTokenEndpoint,
}

/// The subset of an OpenID provider configuration document we read.
///
/// Every member is optional so that a missing `token_endpoint` is reported
/// as such rather than as a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenIdConfiguration {
    pub issuer: Option<String>,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub grant_types_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
}

impl OpenIdConfiguration {
    pub fn parse(body: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(body)?;
        if !value.is_object() {
            return Err(Error::MissingTokenEndpoint);
        }
        // Each member is read on its own; one of the wrong type reads as absent.
        Ok(Self {
            issuer: string_member(&value, "issuer"),
            authorization_endpoint: string_member(&value, "authorization_endpoint"),
            token_endpoint: string_member(&value, "token_endpoint"),
            grant_types_supported: string_list_member(&value, "grant_types_supported"),
            token_endpoint_auth_methods_supported: string_list_member(
                &value,
                "token_endpoint_auth_methods_supported",
            ),
        })
    }

    pub fn into_token_endpoint(self) -> Result<String, Error> {
        self.token_endpoint.ok_or(Error::MissingTokenEndpoint)
    }
}

fn string_member(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(ToOwned::to_owned)
}

fn string_list_member(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Fetch the discovery document at `open_id_config_url`.
pub async fn fetch(
    connection: &Connection,
    open_id_config_url: &str,
) -> Result<OpenIdConfiguration, Error> {
    let res = connection.get(open_id_config_url, true).await?;
    check_status(&res)?;
    let body = res.text().await?;
    let config = OpenIdConfiguration::parse(&body)?;
    debug!(message = "Fetched OpenID configuration", issuer = ?config.issuer);
    Ok(config)
}

/// Fetch the discovery document and pull out its token endpoint.
pub async fn fetch_token_endpoint(
    connection: &Connection,
    open_id_config_url: &str,
) -> Result<String, Error> {
    fetch(connection, open_id_config_url)
        .await?
        .into_token_endpoint()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_document() {
        let config = OpenIdConfiguration::parse(
            r#"{
                "issuer": "https://login.microsoftonline.com/tenant/v2.0",
                "authorization_endpoint": "https://login.microsoftonline.com/tenant/oauth2/v2.0/authorize",
                "token_endpoint": "https://login.microsoftonline.com/tenant/oauth2/v2.0/token",
                "token_endpoint_auth_methods_supported": ["client_secret_post", "client_secret_basic"],
                "jwks_uri": "https://login.microsoftonline.com/tenant/discovery/v2.0/keys"
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.token_endpoint.as_deref(),
            Some("https://login.microsoftonline.com/tenant/oauth2/v2.0/token")
        );
        assert_eq!(config.token_endpoint_auth_methods_supported.len(), 2);
        assert!(config.grant_types_supported.is_empty());
    }

    #[test]
    fn token_endpoint_survives_odd_members() {
        let config =
            OpenIdConfiguration::parse(r#"{"token_endpoint": "https://idp/token", "issuer": 7}"#)
                .unwrap();
        assert_eq!(config.token_endpoint.as_deref(), Some("https://idp/token"));
        assert_eq!(config.issuer, None);
    }

    #[test]
    fn bad_member_does_not_hide_good_ones() {
        let config = OpenIdConfiguration::parse(
            r#"{
                "token_endpoint": "https://idp/t",
                "issuer": "https://idp",
                "grant_types_supported": "client_credentials",
                "token_endpoint_auth_methods_supported": ["client_secret_post", 3]
            }"#,
        )
        .unwrap();
        assert_eq!(config.issuer.as_deref(), Some("https://idp"));
        assert_eq!(config.token_endpoint.as_deref(), Some("https://idp/t"));
        assert!(config.grant_types_supported.is_empty());
        assert_eq!(
            config.token_endpoint_auth_methods_supported,
            vec!["client_secret_post".to_owned()]
        );
    }

    #[test]
    fn missing_or_mistyped_token_endpoint() {
        for body in [r#"{"issuer": "x"}"#, r#"{"token_endpoint": 12}"#, "[]"] {
            let err = OpenIdConfiguration::parse(body)
                .and_then(OpenIdConfiguration::into_token_endpoint)
                .unwrap_err();
            assert!(matches!(err, Error::MissingTokenEndpoint), "{}", body);
        }
    }

    #[test]
    fn not_json() {
        let err = OpenIdConfiguration::parse("<html>oops</html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
