//! One-shot authenticated session against the wallet runtime.
//!
//! [`SessionManager::connect`] runs exactly once at process start: it
//! prompts the wallet for account authorization and hands back an immutable
//! [`SessionHandle`] that every dataset operation receives explicitly. There
//! is no reconnect path; a fresh connect is a fresh process lifecycle.

use std::sync::Arc;

use casting_core::address::Address;
use casting_core::error::{LedgerError, Result};
use casting_core::settings::Settings;
use serde_json::{json, Value};
use tracing::info;

use crate::rpc::{EthRpc, HttpRpc, CODE_USER_REJECTED};

/// The bound, authenticated connection used for all remote calls.
///
/// Shared read-only for the remainder of the session; cloning shares the
/// underlying transport.
#[derive(Clone)]
pub struct SessionHandle {
    rpc: Arc<dyn EthRpc>,
    signer: Address,
    contract: Address,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("signer", &self.signer)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// The transport bound into this session.
    pub fn rpc(&self) -> &Arc<dyn EthRpc> {
        &self.rpc
    }

    /// The account the wallet authorized for signing.
    pub fn signer(&self) -> Address {
        self.signer
    }

    /// The dataset contract this session is bound to.
    pub fn contract(&self) -> Address {
        self.contract
    }
}

/// Acquires the single authenticated path to the remote ledger.
pub struct SessionManager {
    endpoint: String,
    contract: Address,
}

impl SessionManager {
    /// Create a manager for an explicit wallet endpoint and contract.
    pub fn new(endpoint: impl Into<String>, contract: Address) -> Self {
        Self {
            endpoint: endpoint.into(),
            contract,
        }
    }

    /// Resolve the wallet endpoint and contract address from settings.
    ///
    /// Fails with [`LedgerError::EnvironmentUnavailable`] when no wallet
    /// runtime is discoverable (flag, `CASTING_WALLET_RPC`, or persisted
    /// endpoint).
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let endpoint = settings.wallet_endpoint()?.to_string();
        let contract = settings.contract.parse()?;
        Ok(Self { endpoint, contract })
    }

    /// Prompt the wallet for authorization and return the bound handle.
    ///
    /// May block until the human approves the wallet prompt. A rejected
    /// prompt (EIP-1193 code 4001) or an empty account list surfaces as
    /// [`LedgerError::AuthorizationDenied`].
    pub async fn connect(self) -> Result<SessionHandle> {
        let rpc = Arc::new(HttpRpc::new(&self.endpoint)?);
        self.connect_with(rpc).await
    }

    /// Same as [`connect`](Self::connect) but over an injected transport,
    /// enabling unit tests without a live wallet.
    pub async fn connect_with(self, rpc: Arc<dyn EthRpc>) -> Result<SessionHandle> {
        let accounts = rpc
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(|e| match e {
                LedgerError::RpcRejected { code, message } if code == CODE_USER_REJECTED => {
                    LedgerError::AuthorizationDenied(message)
                }
                other => other,
            })?;

        let signer = first_account(&accounts)?;
        info!(signer = %signer, contract = %self.contract, "wallet session established");

        Ok(SessionHandle {
            rpc,
            signer,
            contract: self.contract,
        })
    }
}

/// Pull the first authorized account out of an `eth_requestAccounts` result.
fn first_account(accounts: &Value) -> Result<Address> {
    let first = accounts
        .as_array()
        .and_then(|list| list.first())
        .and_then(Value::as_str)
        .ok_or_else(|| {
            LedgerError::AuthorizationDenied("wallet returned no accounts".to_string())
        })?;
    first.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRpc;
    use casting_core::settings::DEFAULT_CONTRACT_ADDRESS;

    const SIGNER: &str = "0x00000000000000000000000000000000000000aa";

    fn manager() -> SessionManager {
        SessionManager::new(
            "http://wallet.local:8545",
            DEFAULT_CONTRACT_ADDRESS.parse().unwrap(),
        )
    }

    fn settings_with(rpc_url: Option<&str>, contract: &str) -> Settings {
        Settings {
            rpc_url: rpc_url.map(str::to_string),
            contract: contract.to_string(),
            log_level: "INFO".to_string(),
            log_file: None,
            debug: false,
            clear: false,
        }
    }

    #[test]
    fn test_from_settings_without_endpoint_is_environment_unavailable() {
        let err = SessionManager::from_settings(&settings_with(None, DEFAULT_CONTRACT_ADDRESS))
            .err()
            .expect("must fail");
        assert!(matches!(err, LedgerError::EnvironmentUnavailable));
    }

    #[test]
    fn test_from_settings_rejects_bad_contract_address() {
        let err =
            SessionManager::from_settings(&settings_with(Some("http://w:8545"), "not-an-address"))
                .err()
                .expect("must fail");
        assert!(matches!(err, LedgerError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_connect_requests_accounts_and_binds_handle() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push_result(serde_json::json!([SIGNER]));

        let handle = manager().connect_with(rpc.clone()).await.unwrap();

        assert_eq!(handle.signer().to_hex(), SIGNER);
        assert_eq!(
            handle.contract().to_hex(),
            DEFAULT_CONTRACT_ADDRESS.to_lowercase()
        );
        let calls = rpc.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "eth_requestAccounts");
    }

    #[tokio::test]
    async fn test_connect_user_rejection_is_authorization_denied() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push_error(LedgerError::RpcRejected {
            code: CODE_USER_REJECTED,
            message: "User rejected the request.".to_string(),
        });

        let err = manager().connect_with(rpc).await.unwrap_err();
        assert!(matches!(err, LedgerError::AuthorizationDenied(_)));
        assert!(err.is_terminal());
    }

    #[tokio::test]
    async fn test_connect_empty_account_list_is_authorization_denied() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push_result(serde_json::json!([]));

        let err = manager().connect_with(rpc).await.unwrap_err();
        assert!(matches!(err, LedgerError::AuthorizationDenied(_)));
    }

    #[tokio::test]
    async fn test_connect_transport_failure_passes_through() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push_error(LedgerError::Rpc("connection refused".to_string()));

        let err = manager().connect_with(rpc).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rpc(_)));
        assert!(!err.is_terminal());
    }
}
