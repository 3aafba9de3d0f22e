use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use weaviate_auth::{
    auth::{Credentials, ExpiringToken, Token, TokenProvider},
    config::AuthConfig,
    connection::Connection,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let reqwest_client = reqwest::Client::builder()
        .connection_verbose(true)
        .build()
        .context("building HTTP client")?;

    let weaviate_url = getenv("WEAVIATE_URL")?;
    let open_id_config_url = getenv("WEAVIATE_OIDC_CONFIG_URL")?;
    let auth_config = AuthConfig::from_env().context("reading authentication config")?;

    let connection = Connection::with_client(weaviate_url, reqwest_client);
    let credentials = Credentials::new(auth_config, open_id_config_url, &connection)
        .await
        .context("discovering token endpoint")?;

    info!(token_endpoint = credentials.token_endpoint(), "Resolving token");

    print_token(&credentials).await
}

async fn print_token<P>(provider: &P) -> anyhow::Result<()>
where
    P: TokenProvider,
    P::Token: ExpiringToken,
    P::Error: std::error::Error + 'static,
{
    let token = provider
        .get_auth_token()
        .await
        .context("resolving access token")?;

    println!("{}", token.access_token());
    eprintln!("expires in {}s", token.expires_in());

    Ok(())
}

fn getenv(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("env var {} is not set", key))
}
