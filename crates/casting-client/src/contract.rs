//! Typed handle over the dataset contract.
//!
//! Wire surface (names fixed by the deployed contract):
//! - `getEntries() -> uint256` — total count of stored entries
//! - `data(uint256) -> (string,string)` — physical 0-indexed accessor
//! - `pushData(string,string)` — append path, signed by the wallet

use casting_core::abi;
use casting_core::error::{LedgerError, Result};
use casting_core::models::Entry;
use serde_json::{json, Value};
use tracing::debug;

use crate::session::SessionHandle;

/// A contract handle bound to an authenticated session.
pub struct ContractHandle {
    session: SessionHandle,
}

impl ContractHandle {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// The session this handle is bound to.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// `getEntries()`: total number of entries stored in the ledger.
    pub async fn get_entries(&self) -> Result<u64> {
        let returned = self.call(&abi::to_hex(&abi::encode_get_entries())).await?;
        abi::decode_uint256(&returned)
    }

    /// `data(position)`: the entry at a physical 0-indexed slot.
    ///
    /// The position is signed: callers map logical indices through the
    /// `index - 1` convention, so -1 can arrive here and fails in ABI
    /// encoding before any request is sent.
    pub async fn entry_at(&self, position: i64) -> Result<Entry> {
        let calldata = abi::to_hex(&abi::encode_data_at(position)?);
        let returned = self.call(&calldata).await?;
        abi::decode_entry(&returned)
    }

    /// `pushData(temperature, humidity)`: append a reading, signed by the
    /// wallet on behalf of the session's account. Returns the transaction
    /// hash; receipt tracking is out of scope.
    pub async fn push_data(&self, temperature: &str, humidity: &str) -> Result<String> {
        let calldata = abi::to_hex(&abi::encode_push_data(temperature, humidity));
        let params = json!([{
            "from": self.session.signer().to_hex(),
            "to": self.session.contract().to_hex(),
            "data": calldata,
        }]);

        debug!(temperature, humidity, "sending pushData transaction");
        let result = self
            .session
            .rpc()
            .request("eth_sendTransaction", params)
            .await?;
        as_hex_string(result, "eth_sendTransaction")
    }

    /// Issue a read-only `eth_call` against the contract and return the raw
    /// hex return data.
    async fn call(&self, calldata: &str) -> Result<String> {
        let params = json!([
            {
                "to": self.session.contract().to_hex(),
                "data": calldata,
            },
            "latest",
        ]);
        let result = self.session.rpc().request("eth_call", params).await?;
        as_hex_string(result, "eth_call")
    }
}

fn as_hex_string(value: Value, method: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LedgerError::Rpc(format!("{method} result is not a hex string")))
}
