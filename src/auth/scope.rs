//! Scope selection for the client credentials grant.

use reqwest::Url;

/// Default scopes for well known identity providers, keyed by token endpoint host.
const FALLBACK_SCOPES: &[(&str, &str)] = &[(
    "login.microsoftonline.com",
    "https://graph.microsoft.com/.default",
)];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no scope configured and none known for token endpoint {token_endpoint}")]
pub struct MissingScope {
    pub token_endpoint: String,
}

/// Pick the configured scope, or the provider default for `token_endpoint`.
pub fn resolve(configured: Option<&str>, token_endpoint: &str) -> Result<String, MissingScope> {
    if let Some(scope) = configured {
        return Ok(scope.to_owned());
    }

    fallback(token_endpoint)
        .map(ToOwned::to_owned)
        .ok_or_else(|| MissingScope {
            token_endpoint: token_endpoint.to_owned(),
        })
}

fn fallback(token_endpoint: &str) -> Option<&'static str> {
    let url = Url::parse(token_endpoint).ok()?;
    if url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?;
    FALLBACK_SCOPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(host))
        .map(|(_, scope)| *scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AZURE_TOKEN_ENDPOINT: &str =
        "https://login.microsoftonline.com/tenant/oauth2/v2.0/token";

    #[test]
    fn configured_scope_wins() {
        let scope = resolve(Some("openid offline_access"), AZURE_TOKEN_ENDPOINT).unwrap();
        assert_eq!(scope, "openid offline_access");
    }

    #[test]
    fn azure_default() {
        let scope = resolve(None, AZURE_TOKEN_ENDPOINT).unwrap();
        assert_eq!(scope, "https://graph.microsoft.com/.default");
    }

    #[test]
    fn unknown_host() {
        let err = resolve(None, "https://auth.example.com/oauth/token").unwrap_err();
        assert_eq!(err.token_endpoint, "https://auth.example.com/oauth/token");
    }

    #[test]
    fn lookalike_hosts_do_not_match() {
        assert!(resolve(None, "https://login.microsoftonline.com.example.com/token").is_err());
        assert!(resolve(None, "http://login.microsoftonline.com/tenant/token").is_err());
        assert!(resolve(None, "not a url").is_err());
    }
}
