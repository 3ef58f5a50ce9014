//! Ledger access layer for the casting ledger client.
//!
//! Responsible for the JSON-RPC transport to the wallet runtime, the
//! one-shot authenticated session, and the bound contract handle used for
//! all dataset reads and writes.

pub mod contract;
pub mod rpc;
pub mod session;
pub mod testing;

pub use casting_core as core;
pub use contract::ContractHandle;
pub use rpc::{EthRpc, HttpRpc, HttpRpcConfig};
pub use session::{SessionHandle, SessionManager};
