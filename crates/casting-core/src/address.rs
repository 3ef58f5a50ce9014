use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// A 20-byte Ethereum address, parsed from 0x-prefixed hex.
///
/// Used for the contract address and the signer account bound into a
/// session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address([u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex rendering with the `0x` prefix, the form expected in
    /// JSON-RPC request objects.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| LedgerError::InvalidAddress(format!("{s}: {e}")))?;
        let arr: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
            LedgerError::InvalidAddress(format!("{s}: expected 20 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x3B7410b19BF8a16E380c6269E88405687916B811";

    #[test]
    fn test_parse_with_prefix() {
        let addr: Address = CONTRACT.parse().expect("valid address");
        assert_eq!(addr.to_hex(), CONTRACT.to_lowercase());
    }

    #[test]
    fn test_parse_without_prefix() {
        let addr: Address = CONTRACT[2..].parse().expect("valid address");
        assert_eq!(addr.to_hex(), CONTRACT.to_lowercase());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(err.to_string().contains("expected 20 bytes"));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!("0xzz7410b19bf8a16e380c6269e88405687916b811"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn test_display_matches_to_hex() {
        let addr: Address = CONTRACT.parse().unwrap();
        assert_eq!(addr.to_string(), addr.to_hex());
    }
}
