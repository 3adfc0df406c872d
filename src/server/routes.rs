use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{ConfigError, RefreshError};
use crate::refresher::TokenRefresher;
use crate::server::server::AppState;

pub const INIT_PATH: &str = "/v1/init";
pub const REFRESH_POLICY_PATH: &str = "/v1/refresh-policy";
pub const TOKEN_REFRESH_PATH: &str = "/v1/token-refresh";
pub const HEALTH_PATH: &str = "/healthz";

/// Host-facing side of the adapter: the currently active refresher, if any.
///
/// A new initialization replaces the refresher as a whole; a refresh already
/// running keeps the instance it started with.
#[derive(Clone)]
pub struct PluginState {
    refresher: Arc<RwLock<Option<TokenRefresher>>>,
    refresh_timeout: Duration,
    shutdown: CancellationToken,
}

impl PluginState {
    pub fn new(refresh_timeout: Duration, shutdown: CancellationToken) -> Self {
        Self {
            refresher: Arc::new(RwLock::new(None)),
            refresh_timeout,
            shutdown,
        }
    }

    pub async fn initialize(&self, raw_config: &[u8]) -> Result<(), ConfigError> {
        let refresher = TokenRefresher::initialize(raw_config).await?;
        *self.refresher.write().await = Some(refresher);
        Ok(())
    }

    pub async fn current(&self) -> Option<TokenRefresher> {
        self.refresher.read().await.clone()
    }

    pub fn router(&self) -> Router<AppState> {
        Router::new()
            .route(INIT_PATH, post(init))
            .route(REFRESH_POLICY_PATH, get(refresh_policy))
            .route(TOKEN_REFRESH_PATH, post(token_refresh))
            .route(HEALTH_PATH, get(|| async { StatusCode::OK }))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenRefreshRequest {
    pub current_token: String,
    pub psi: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenRefreshResponse {
    pub token: String,
}

/// Wire form of every adapter failure.
pub enum ApiError {
    NotInitialized,
    Config(ConfigError),
    Refresh(RefreshError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotInitialized => (
                StatusCode::PRECONDITION_FAILED,
                json!({ "error": "plugin is not initialized" }),
            ),
            ApiError::Config(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            ApiError::Refresh(e) => {
                let status = match e {
                    RefreshError::Transport(_)
                    | RefreshError::Decode { .. }
                    | RefreshError::Provider { .. } => StatusCode::BAD_GATEWAY,
                    RefreshError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    RefreshError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
                };
                let body = match &e {
                    RefreshError::Provider { code, description } => json!({
                        "error": e.reason(),
                        "code": code,
                        "description": description,
                    }),
                    _ => json!({ "error": e.reason(), "message": e.to_string() }),
                };
                (status, body)
            }
        };
        (status, Json(body)).into_response()
    }
}

async fn init(State(state): State<AppState>, raw_config: Bytes) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .plugin_state
        .initialize(&raw_config)
        .await
        .map_err(ApiError::Config)?;
    info!("plugin initialized by host");
    Ok(Json(json!({})))
}

async fn refresh_policy(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let refresher = state.plugin_state.current().await.ok_or(ApiError::NotInitialized)?;
    Ok(Json(refresher.refresh_policy()))
}

async fn token_refresh(
    State(state): State<AppState>,
    Json(request): Json<TokenRefreshRequest>,
) -> Result<Json<TokenRefreshResponse>, ApiError> {
    let plugin_state = &state.plugin_state;
    let refresher = plugin_state.current().await.ok_or(ApiError::NotInitialized)?;

    // fires on server shutdown, or when the host drops the connection
    let cancel = plugin_state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let outcome = tokio::time::timeout(
        plugin_state.refresh_timeout,
        refresher.refresh_token(&request.current_token, &request.psi, &cancel),
    )
    .await
    .unwrap_or_else(|_| {
        warn!(psi = %request.psi, "token refresh timed out");
        Err(RefreshError::Cancelled)
    })
    .map_err(ApiError::Refresh)?;

    Ok(Json(TokenRefreshResponse { token: outcome.into_token() }))
}
