//! Minimal ABI codec for the three fixed contract functions.
//!
//! The contract surface is small enough that general ABI machinery is not
//! worth carrying: `getEntries()`, `data(uint256)` and
//! `pushData(string,string)` are encoded and decoded by hand here.
//! Selectors are the first four bytes of the Keccak-256 hash of the
//! canonical signature.

use sha3::{Digest, Keccak256};

use crate::error::{LedgerError, Result};
use crate::models::Entry;

const WORD: usize = 32;

/// Canonical signature of the entry-count accessor.
pub const SIG_GET_ENTRIES: &str = "getEntries()";
/// Canonical signature of the physical 0-indexed entry accessor.
pub const SIG_DATA: &str = "data(uint256)";
/// Canonical signature of the append function.
pub const SIG_PUSH_DATA: &str = "pushData(string,string)";

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Render calldata or return data as a 0x-prefixed hex string.
pub fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Calldata for `getEntries()`.
pub fn encode_get_entries() -> Vec<u8> {
    selector(SIG_GET_ENTRIES).to_vec()
}

/// Calldata for `data(uint256)` at the given physical position.
///
/// The position is signed because the logical-to-physical mapping is
/// `index - 1`, so logical index 0 arrives here as -1. A negative position
/// has no `uint256` encoding and fails here, before any bytes hit the wire.
pub fn encode_data_at(position: i64) -> Result<Vec<u8>> {
    let position = u64::try_from(position).map_err(|_| {
        LedgerError::Abi(format!("cannot encode negative position {position} as uint256"))
    })?;
    let mut calldata = selector(SIG_DATA).to_vec();
    calldata.extend_from_slice(&uint_word(position));
    Ok(calldata)
}

/// Calldata for `pushData(string,string)`.
pub fn encode_push_data(temperature: &str, humidity: &str) -> Vec<u8> {
    let mut calldata = selector(SIG_PUSH_DATA).to_vec();

    let temp_tail = string_tail(temperature);
    let hum_tail = string_tail(humidity);

    // Head: two offsets into the argument area, then both tails.
    calldata.extend_from_slice(&uint_word(2 * WORD as u64));
    calldata.extend_from_slice(&uint_word((2 * WORD + temp_tail.len()) as u64));
    calldata.extend_from_slice(&temp_tail);
    calldata.extend_from_slice(&hum_tail);
    calldata
}

/// Decode a single `uint256` return value into a `u64`.
///
/// Entry counts far beyond `u64::MAX` are not representable locally and are
/// reported as a decode failure rather than silently truncated.
pub fn decode_uint256(data: &str) -> Result<u64> {
    let bytes = strip_and_decode(data)?;
    if bytes.len() < WORD {
        return Err(LedgerError::Abi(format!(
            "uint256 return too short: {} bytes",
            bytes.len()
        )));
    }
    let word = &bytes[..WORD];
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(LedgerError::Abi("uint256 value exceeds u64 range".to_string()));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(tail))
}

/// Decode a `(string temperature, string humidity)` return value.
pub fn decode_entry(data: &str) -> Result<Entry> {
    let bytes = strip_and_decode(data)?;
    if bytes.len() < 2 * WORD {
        return Err(LedgerError::Abi(format!(
            "entry return too short: {} bytes",
            bytes.len()
        )));
    }
    let temperature = read_string_at(&bytes, read_offset(&bytes, 0)?)?;
    let humidity = read_string_at(&bytes, read_offset(&bytes, WORD)?)?;
    Ok(Entry {
        temperature,
        humidity,
    })
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// A `u64` widened into a big-endian 32-byte word.
fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Tail encoding of a dynamic string: length word, then the bytes padded up
/// to a word boundary.
fn string_tail(s: &str) -> Vec<u8> {
    let raw = s.as_bytes();
    let padded_len = raw.len().div_ceil(WORD) * WORD;
    let mut tail = uint_word(raw.len() as u64).to_vec();
    tail.extend_from_slice(raw);
    tail.resize(WORD + padded_len, 0);
    tail
}

fn strip_and_decode(data: &str) -> Result<Vec<u8>> {
    let stripped = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(stripped).map_err(|e| LedgerError::Abi(format!("invalid hex return data: {e}")))
}

/// Read the word at `at` as a usize offset into the argument area.
fn read_offset(bytes: &[u8], at: usize) -> Result<usize> {
    let word = at
        .checked_add(WORD)
        .and_then(|end| bytes.get(at..end))
        .ok_or_else(|| LedgerError::Abi(format!("offset word at {at} out of bounds")))?;
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(LedgerError::Abi(format!("offset word at {at} too large")));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(tail))
        .map_err(|_| LedgerError::Abi(format!("offset word at {at} too large")))
}

/// Read a length-prefixed string whose tail starts at `offset`.
fn read_string_at(bytes: &[u8], offset: usize) -> Result<String> {
    let len = read_offset(bytes, offset)?;
    let start = offset + WORD;
    let end = start
        .checked_add(len)
        .ok_or_else(|| LedgerError::Abi(format!("string at {offset} has absurd length")))?;
    let raw = bytes
        .get(start..end)
        .ok_or_else(|| LedgerError::Abi(format!("string at {offset} truncated")))?;
    String::from_utf8(raw.to_vec())
        .map_err(|e| LedgerError::Abi(format!("string at {offset} is not UTF-8: {e}")))
}
