//! HTTP connection to a database instance.

use tracing::debug;

/// Thin wrapper over a [`reqwest::Client`] bound to a database base URL.
#[derive(Debug, Clone)]
pub struct Connection {
    client: reqwest::Client,
    url: String,
}

impl Connection {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        let url = url.into().trim_end_matches('/').to_owned();
        Self { client, url }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET either a path relative to the database URL or, with
    /// `external_url`, an absolute URL as given. A missing leading `/` on a
    /// relative path is added.
    pub async fn get(
        &self,
        path: &str,
        external_url: bool,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = if external_url {
            path.to_owned()
        } else if path.starts_with('/') {
            format!("{}{}", self.url, path)
        } else {
            format!("{}/{}", self.url, path)
        };
        debug!(message = "GET", url = %url, external_url);
        self.client.get(url).send().await
    }
}
