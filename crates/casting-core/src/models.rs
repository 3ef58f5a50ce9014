use serde::{Deserialize, Serialize};

/// A single sensor reading stored at a fixed position in the ledger's
/// append-only sequence. Never cached; always fetched fresh from the remote
/// store.
///
/// Both fields are strings on the wire (the contract stores them as
/// `string`, not as numeric types).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Recorded temperature, as written by the sensor gateway.
    pub temperature: String,
    /// Recorded humidity, as written by the sensor gateway.
    pub humidity: String,
}

impl Entry {
    pub fn new(temperature: impl Into<String>, humidity: impl Into<String>) -> Self {
        Self {
            temperature: temperature.into(),
            humidity: humidity.into(),
        }
    }
}

/// The locally cached understanding of ledger size, refreshed once at
/// startup.
///
/// May go stale if the ledger is appended to after the load; there is no
/// live subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    /// Total number of entries the ledger reported at load time.
    pub total_entries: u64,
    /// The entry at physical position `total_entries - 1`, or `None` when
    /// the ledger is empty or the load failed.
    pub latest_entry: Option<Entry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_construction() {
        let entry = Entry::new("15", "60");
        assert_eq!(entry.temperature, "15");
        assert_eq!(entry.humidity, "60");
    }

    #[test]
    fn test_snapshot_default_is_empty() {
        let snapshot = DatasetSnapshot::default();
        assert_eq!(snapshot.total_entries, 0);
        assert!(snapshot.latest_entry.is_none());
    }

    #[test]
    fn test_entry_serde_round_trip() {
        let entry = Entry::new("12.5", "55");
        let json = serde_json::to_string(&entry).unwrap();
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
