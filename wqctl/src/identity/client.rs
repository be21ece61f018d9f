//! HTTP client for the identity service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::IdentityConfig;
use crate::identity::{AdminDirectory, ExternalUser};

/// Responses from the identity service wrap their payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Option<T>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("cannot build identity service URL from {base}")]
    InvalidBaseUrl { base: Url },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("identity service returned {status} for {url}")]
    Status { url: Url, status: StatusCode },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

/// [`AdminDirectory`] backed by the identity service's HTTP API.
///
/// Every failed attempt (transport error, non-2xx status, undecodable body) is retried with
/// exponential backoff; whatever still fails is logged and reported as empty.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    initial_backoff: Duration,
}

impl IdentityClient {
    pub fn new(config: &IdentityConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IdentityError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IdentityError::InvalidBaseUrl {
                base: self.base_url.clone(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, IdentityError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| IdentityError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status { url: url.clone(), status });
        }

        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|source| IdentityError::Decode { url: url.clone(), source })?;
        Ok(envelope.data)
    }

    /// GET a `{ "data": T }` resource, retrying failed attempts.
    #[instrument(skip(self), fields(url = tracing::field::Empty))]
    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>, IdentityError> {
        let url = self.endpoint(segments)?;
        tracing::Span::current().record("url", url.as_str());

        let mut attempt = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(data) => return Ok(data),
                Err(e) if attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    debug!(attempt = attempt + 1, ?delay, error = %e, "Retrying identity service request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl AdminDirectory for IdentityClient {
    async fn organization_admins(&self, organization_id: &str) -> Vec<ExternalUser> {
        match self
            .fetch::<Vec<ExternalUser>>(&["internal", "organizations", organization_id, "admins"])
            .await
        {
            Ok(admins) => admins.unwrap_or_default(),
            Err(e) => {
                warn!(organization_id, error = %e, "Identity service unavailable, continuing without organization admins");
                Vec::new()
            }
        }
    }

    async fn user_by_id(&self, user_id: &str) -> Option<ExternalUser> {
        match self.fetch::<ExternalUser>(&["api", "users", user_id]).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user_id, error = %e, "Identity service unavailable, continuing without user");
                None
            }
        }
    }
}
