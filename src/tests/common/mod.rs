// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::any;
use axum::Json;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use chrono::Utc;
use reqwest::Client;

use crate::config::plugin::PluginConfig;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// A request as seen by a capturing token endpoint.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedRequest {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Token endpoint on `/token` that records every request and answers `response`
/// after `delay`.
pub async fn spawn_token_endpoint(
    status: StatusCode,
    response: serde_json::Value,
    delay: Duration,
) -> (JoinHandle<()>, SocketAddr, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();
    let router = Router::new().route(
        "/token",
        any(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let sink = sink.clone();
            let response = response.clone();
            async move {
                sink.lock().unwrap().push(CapturedRequest { method, uri, headers, body });
                tokio::time::sleep(delay).await;
                (status, Json(response))
            }
        }),
    );
    let (handle, addr) = spawn_axum(router).await;
    (handle, addr, captured)
}

/// Unsigned token whose payload is `{"exp": exp}`
pub fn sample_jwt(exp: i64) -> String {
    let header = STANDARD_NO_PAD.encode(r#"{"alg":"none"}"#);
    let payload = STANDARD_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
    format!("{}.{}.", header, payload)
}

pub fn now_plus(seconds: i64) -> i64 {
    Utc::now().timestamp() + seconds
}

pub fn plugin_config(url: String, method: &str, anticipation_ms: i32) -> PluginConfig {
    PluginConfig {
        url,
        method: method.to_owned(),
        tls_skip_verify: false,
        refresh_anticipation_in_millisecond: anticipation_ms,
        parameters: BTreeMap::from([
            ("grant_type".to_owned(), "client_credentials".to_owned()),
            ("client_id".to_owned(), "${PSI}".to_owned()),
            ("client_secret".to_owned(), "foofoo".to_owned()),
            ("scope".to_owned(), "rpc://eth_* p2p://qlight psi://${PSI}?self.eoa=0x0&node.eoa=0x0".to_owned()),
        ]),
    }
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
