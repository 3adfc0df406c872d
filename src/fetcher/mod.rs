//! Credential fetcher
//!
//! Sends one request to the configured token endpoint and turns the answer into
//! a scheme-labelled token. No retries, no caching.

pub mod request;
pub mod response;

use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::plugin::PluginConfig;
use crate::errors::{ConfigError, RefreshError};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

use request::TokenRequest;
use response::ProviderResponse;

#[derive(Debug, Clone)]
pub struct CredentialFetcher {
    config: Arc<PluginConfig>,
    client: Client,
}

impl CredentialFetcher {
    pub fn new(config: Arc<PluginConfig>) -> Result<Self, ConfigError> {
        if config.tls_skip_verify {
            warn!(url = %config.url, "TLS certificate verification is disabled for the token endpoint");
        }
        let client = Client::builder()
            .danger_accept_invalid_certs(config.tls_skip_verify)
            .build()
            .map_err(|e| ConfigError::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Fetch a new token for `psi`, aborting as soon as `cancel` fires.
    pub async fn fetch(&self, psi: &str, cancel: &CancellationToken) -> Result<String, RefreshError> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RefreshError::Cancelled),
            result = self.exchange(psi) => result,
        };

        metrics
            .provider_fetch_duration
            .observe(start.elapsed().as_secs_f64());
        if let Err(e) = &result {
            metrics
                .provider_fetch_failures
                .with_label_values(&[e.reason()])
                .inc();
        }
        result
    }

    async fn exchange(&self, psi: &str) -> Result<String, RefreshError> {
        let request = TokenRequest::resolve(&self.config, psi)?;
        info!(
            method = %request.method,
            url = %request.url,
            encoding = ?request.encoding,
            "requesting new token"
        );

        let response = request
            .into_request_builder(&self.client)?
            .send()
            .await
            .map_err(RefreshError::Transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(RefreshError::Transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "provider responded");

        ProviderResponse::decode(status.as_u16(), &body)?.into_token(status.as_u16())
    }
}
