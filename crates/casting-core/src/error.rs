use thiserror::Error;

/// All errors produced by the casting ledger client.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No wallet-capable runtime could be discovered in the environment.
    /// Terminal: the user must install or enable a wallet endpoint.
    #[error(
        "No wallet runtime available: set --rpc-url or CASTING_WALLET_RPC to a wallet endpoint"
    )]
    EnvironmentUnavailable,

    /// The user rejected the account-authorization prompt.
    #[error("Wallet authorization denied: {0}")]
    AuthorizationDenied(String),

    /// A user-supplied logical index failed client-side validation.
    #[error("Index {index} out of range: enter a number from 0 to {total}")]
    IndexOutOfRange { index: i64, total: u64 },

    /// A remote call failed at the transport level (connect, timeout, HTTP).
    #[error("Remote call failed: {0}")]
    Rpc(String),

    /// The remote endpoint answered with a JSON-RPC error object.
    #[error("RPC rejected request ({code}): {message}")]
    RpcRejected { code: i64, message: String },

    /// Calldata could not be encoded or return data could not be decoded.
    #[error("ABI error: {0}")]
    Abi(String),

    /// An address string is not a valid 20-byte hex address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for raw I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    /// `true` for the startup failures that block all further functionality.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LedgerError::EnvironmentUnavailable | LedgerError::AuthorizationDenied(_)
        )
    }
}

/// Convenience alias used throughout the ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;
