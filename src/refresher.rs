//! Entry point for the three host operations: initialize, refresh policy and
//! token refresh. Nothing here knows about the transport carrying them.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::plugin::PluginConfig;
use crate::errors::{ConfigError, RefreshError};
use crate::fetcher::CredentialFetcher;
use crate::freshness::{self, Freshness};
use crate::observability::metrics::get_metrics;

static UNCHANGED_MSG: &'static str = "unchanged";
static REFRESHED_MSG: &'static str = "refreshed";
static ERROR_MSG: &'static str = "error";

/// What the host should present from now on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// current token still outlives the anticipation window
    Unchanged(String),
    /// freshly fetched, scheme labelled
    Refreshed(String),
}

impl RefreshOutcome {
    pub fn token(&self) -> &str {
        match self {
            RefreshOutcome::Unchanged(token) | RefreshOutcome::Refreshed(token) => token,
        }
    }

    pub fn into_token(self) -> String {
        match self {
            RefreshOutcome::Unchanged(token) | RefreshOutcome::Refreshed(token) => token,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshPolicy {
    pub refresh_anticipation_in_millisecond: i32,
}

/// Immutable after initialization; clone freely and share across tasks.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    config: Arc<PluginConfig>,
    fetcher: CredentialFetcher,
}

impl TokenRefresher {
    /// Decode, validate and freeze a raw configuration.
    pub async fn initialize(raw_config: &[u8]) -> Result<Self, ConfigError> {
        let result = PluginConfig::from_raw(raw_config).and_then(Self::new);
        if let Err(e) = &result {
            warn!("plugin initialization rejected: {}", e);
            get_metrics().await.config_init_failures.inc();
        }
        result
    }

    pub fn new(config: PluginConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        let fetcher = CredentialFetcher::new(config.clone())?;
        info!(url = %config.url, method = %config.method, "token refresher initialized");
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            refresh_anticipation_in_millisecond: self.config.anticipation_millis(),
        }
    }

    /// Returns `current_token` untouched while it is fresh, otherwise makes
    /// exactly one attempt at the token endpoint.
    pub async fn refresh_token(
        &self,
        current_token: &str,
        psi: &str,
        cancel: &CancellationToken,
    ) -> Result<RefreshOutcome, RefreshError> {
        let metrics = get_metrics().await;

        if freshness::evaluate(current_token, self.config.anticipation_window()) == Freshness::Fresh {
            debug!(psi, "current token is fresh");
            metrics.refresh_requests.with_label_values(&[UNCHANGED_MSG]).inc();
            return Ok(RefreshOutcome::Unchanged(current_token.to_owned()));
        }

        match self.fetcher.fetch(psi, cancel).await {
            Ok(token) => {
                info!(psi, "token refreshed");
                metrics.refresh_requests.with_label_values(&[REFRESHED_MSG]).inc();
                Ok(RefreshOutcome::Refreshed(token))
            }
            Err(e) => {
                warn!(psi, reason = e.reason(), "token refresh failed: {}", e);
                metrics.refresh_requests.with_label_values(&[ERROR_MSG]).inc();
                Err(e)
            }
        }
    }
}
