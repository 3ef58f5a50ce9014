//! JSON-RPC 2.0 transport to the wallet runtime.
//!
//! Every remote interaction goes through the [`EthRpc`] trait; [`HttpRpc`]
//! is the production implementation over HTTP. Tests substitute a scripted
//! implementation (see [`crate::testing`]).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use casting_core::error::{LedgerError, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// EIP-1193 error code for a user-rejected request.
pub const CODE_USER_REJECTED: i64 = 4001;

/// A single JSON-RPC request against the wallet endpoint.
///
/// Implementations return the `result` member of the response envelope, or
/// [`LedgerError::RpcRejected`] when the endpoint answered with an `error`
/// object.
#[async_trait]
pub trait EthRpc: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Production transport: JSON-RPC 2.0 over HTTP via `reqwest`.
#[derive(Debug)]
pub struct HttpRpc {
    client: Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl HttpRpc {
    /// Create a transport with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(endpoint, HttpRpcConfig::default())
    }

    /// Create a transport with custom configuration.
    pub fn with_config(endpoint: impl Into<String>, config: HttpRpcConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The normalized endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EthRpc for HttpRpc {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "sending JSON-RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rpc(format!(
                "endpoint returned HTTP {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Rpc(format!("invalid JSON-RPC response: {e}")))?;

        parse_envelope(body)
    }
}

/// Extract `result` from a JSON-RPC response envelope, surfacing `error`
/// objects as [`LedgerError::RpcRejected`].
fn parse_envelope(body: Value) -> Result<Value> {
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32603);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(LedgerError::RpcRejected { code, message });
    }

    body.get("result")
        .cloned()
        .ok_or_else(|| LedgerError::Rpc("response has neither result nor error".to_string()))
}

/// Map transport-level `reqwest` failures onto the error taxonomy.
fn classify_reqwest_error(e: reqwest::Error) -> LedgerError {
    if e.is_connect() {
        LedgerError::Rpc(format!("connection refused: {e}"))
    } else if e.is_timeout() {
        LedgerError::Rpc(format!("request timed out: {e}"))
    } else {
        LedgerError::Rpc(format!("HTTP request failed: {e}"))
    }
}

/// Configuration for [`HttpRpc`].
#[derive(Debug, Clone)]
pub struct HttpRpcConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Default for HttpRpcConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}
