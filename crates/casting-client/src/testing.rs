//! Scripted [`EthRpc`] implementation for tests.
//!
//! Responses are queued ahead of time and consumed in order; every request
//! is recorded so tests can assert exactly which remote calls were issued.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use casting_core::error::{LedgerError, Result};
use serde_json::Value;

use crate::rpc::EthRpc;

/// In-memory wallet endpoint that replays a fixed script.
#[derive(Default)]
pub struct ScriptedRpc {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_result(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: LedgerError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every `(method, params)` pair requested so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl EthRpc for ScriptedRpc {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LedgerError::Rpc("scripted responses exhausted".to_string())))
    }
}
