//! Core domain layer for the casting ledger client.
//!
//! Holds the entry/snapshot models, the error taxonomy, the minimal ABI
//! codec for the three contract functions, Ethereum address parsing, and
//! CLI settings with last-used persistence.

pub mod abi;
pub mod address;
pub mod error;
pub mod models;
pub mod settings;

pub use address::Address;
pub use error::{LedgerError, Result};
pub use models::{DatasetSnapshot, Entry};
