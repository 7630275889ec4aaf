//! GitHub contents API client.
//!
//! One upload performs two calls against the same object path:
//!
//! 1. `GET /repos/{account}/{repo}/contents/{brand}/{file}` - existence
//!    check. A 2xx body carries the object's `sha`, which becomes the
//!    [`VersionMarker`] for the write. Any failure here (404, auth problem,
//!    transient error, parse error) is swallowed and treated as "object does
//!    not exist"; the existence check must never abort the upload.
//! 2. `PUT` to the same path with `{message, content, sha?}`. Including the
//!    `sha` makes the store overwrite that version; omitting it creates a new
//!    file. Non-2xx responses surface as upstream errors carrying the store's
//!    reported message when parseable.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::StoreConfig;
use crate::errors::Error;
use crate::store::{ObjectPath, VersionMarker};

const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// The two process-scoped secrets required to reach the remote store.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub token: String,
    pub account: String,
}

/// Client for the remote object store. Holds a shared HTTP client with the
/// configured request timeout; safe to share across requests behind an `Arc`.
pub struct GitHubStore {
    client: Client,
    api_base: Url,
    repository: String,
    user_agent: String,
    credentials: Option<StoreCredentials>,
}

impl GitHubStore {
    pub fn from_config(config: &StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        let credentials = match (&config.token, &config.account) {
            (Some(token), Some(account)) => Some(StoreCredentials {
                token: token.clone(),
                account: account.clone(),
            }),
            _ => None,
        };

        Self {
            client,
            api_base: config.api_base.clone(),
            repository: config.repository.clone(),
            user_agent: config.user_agent.clone(),
            credentials,
        }
    }

    /// Check that both secrets are present, before any outbound call is made.
    pub fn ensure_configured(&self) -> Result<(), Error> {
        self.credentials().map(|_| ())
    }

    fn credentials(&self) -> Result<&StoreCredentials, Error> {
        self.credentials.as_ref().ok_or_else(|| {
            tracing::error!("Remote store credentials missing: set GITHUB_TOKEN and GITHUB_USERNAME");
            Error::Configuration
        })
    }

    /// `{api_base}/repos/{account}/{repo}/contents/{brand}/{file}`
    fn contents_url(&self, account: &str, path: &ObjectPath) -> Result<Url, Error> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Other(anyhow::anyhow!("store api_base cannot be a base URL: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", account, &self.repository, "contents", path.brand(), path.file()]);
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder, credentials: &StoreCredentials) -> RequestBuilder {
        request
            .header(reqwest::header::AUTHORIZATION, format!("token {}", credentials.token))
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
    }

    /// Fetch the current version marker for the object at `path`.
    ///
    /// Infallible by contract: every failure is logged and mapped to `None`
    /// ("object does not exist"), so a flaky existence check can never abort
    /// the upload that follows it.
    pub async fn current_version(&self, path: &ObjectPath) -> Option<VersionMarker> {
        match self.fetch_version(path).await {
            Ok(marker) => {
                debug!(%path, marker = marker.as_str(), "object exists, will overwrite");
                Some(marker)
            }
            Err(e) => {
                debug!(%path, "existence check failed, treating object as new: {e:#}");
                None
            }
        }
    }

    async fn fetch_version(&self, path: &ObjectPath) -> anyhow::Result<VersionMarker> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("store credentials not configured"))?;
        let url = self.contents_url(&credentials.account, path)?;

        let response = self.authed(self.client.get(url), credentials).send().await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("existence check returned {status}");
        }

        let metadata: ContentsMetadata = response.json().await?;
        Ok(VersionMarker::new(metadata.sha))
    }

    /// Write `content` (base64, relayed verbatim) to the object at `path`.
    ///
    /// Passing a marker overwrites that version; passing `None` creates the
    /// object. The caller must have called [`ensure_configured`] first; the
    /// credential check here only guards against misuse.
    ///
    /// [`ensure_configured`]: GitHubStore::ensure_configured
    pub async fn put(&self, path: &ObjectPath, message: &str, content: &str, marker: Option<&VersionMarker>) -> Result<(), Error> {
        let credentials = self.credentials()?;
        let url = self.contents_url(&credentials.account, path)?;

        let body = PutContentsRequest {
            message,
            content,
            sha: marker.map(VersionMarker::as_str),
        };

        let response = self
            .authed(self.client.put(url.clone()), credentials)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream {
                message: Some(e.to_string()),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%path, %status, "remote store accepted write");
            return Ok(());
        }

        let body_text = response.text().await.unwrap_or_default();
        tracing::error!(%status, "Remote store rejected write to {url}: {body_text}");

        let message = serde_json::from_str::<StoreErrorBody>(&body_text).ok().and_then(|b| b.message);
        Err(Error::Upstream { message })
    }
}

/// Subset of the contents API read response we care about.
#[derive(Debug, Deserialize)]
struct ContentsMetadata {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Error responses from the store usually carry a human-readable message.
#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
}
