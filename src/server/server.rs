use anyhow::{Context, Result};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;
use crate::config::settings::{MetricsConfig, SettingsConfig};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes::PluginState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub plugin_state: PluginState,
}

impl AppState {
    pub fn new (
        metrics: &Metrics,
        plugin_state: PluginState,
    ) -> Self{
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            plugin_state,
        }
    }
}

/// Router carrying the plugin operations and, when enabled, the metrics endpoint.
pub async fn app(metrics_config: &MetricsConfig, plugin_state: PluginState) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, plugin_state);

    Router::new()
        .merge(state.plugin_state.router())
        .merge(state.metrics_state.router(metrics_config).await)
        .with_state(state)
}

/// Serve the plugin operations until `shutdown` fires.
pub async fn start(
    settings_config: &SettingsConfig,
    plugin_state: PluginState,
    shutdown: CancellationToken,
) -> Result<()> {
    let metrics = get_metrics().await;
    let app = app(&settings_config.metrics, plugin_state).await;

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port))
        .await
        .with_context(|| format!("cannot bind {}:{}", bind_addr, port))?;
    info!("listening on {}:{}", bind_addr, port);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    metrics.up.set(0);

    Ok(())
}
