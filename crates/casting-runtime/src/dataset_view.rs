//! Observable dataset state and the index-resolution algorithm.
//!
//! [`DatasetView`] caches the ledger size and latest entry once at startup
//! ([`DatasetView::load_snapshot`]) and thereafter serves on-demand index
//! lookups ([`DatasetView::lookup_by_index`]). All state lives in this one
//! owned struct, passed by reference to each operation; there are no
//! ambient globals.
//!
//! The remote store is 1-indexed internally but exposes a 0-indexed
//! physical accessor, so a logical user index `i` resolves to physical
//! position `i - 1`, while the latest entry lives at `count - 1`. The
//! validation bound for lookups is the inclusive range
//! `0 <= i <= total_entries`, carried over from the deployed frontend
//! unchanged (see DESIGN.md for the off-by-one note).

use casting_client::ContractHandle;
use casting_core::error::{LedgerError, Result};
use casting_core::models::{DatasetSnapshot, Entry};
use tracing::{debug, warn};

/// Lifecycle phase of the view for one logical session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// No snapshot load attempted yet.
    #[default]
    Uninitialized,
    /// Snapshot load in progress.
    Loading,
    /// Snapshot load succeeded.
    Ready,
    /// Snapshot load failed; totals kept at their prior value and the view
    /// stays usable for lookups (which then fail bounds checks or remote
    /// calls on their own).
    Degraded,
}

/// The retained result of the most recent explicit index lookup.
///
/// Superseded by each new lookup; at most one outstanding result is kept.
/// The generation number is monotonic per view, so a consumer that issues
/// overlapping lookups can discard completions that arrive out of order.
/// The view itself keeps last-arrival-wins semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    /// Sequence number of the request that produced this result.
    pub generation: u64,
    /// The logical index the user asked for.
    pub requested_index: i64,
    /// The entry the remote store resolved it to.
    pub entry: Entry,
}

/// Local view over the remote dataset: size, latest entry, last lookup.
#[derive(Debug, Default)]
pub struct DatasetView {
    phase: ViewPhase,
    snapshot: DatasetSnapshot,
    last_lookup: Option<LookupResult>,
    lookup_generation: u64,
}

impl DatasetView {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn snapshot(&self) -> &DatasetSnapshot {
        &self.snapshot
    }

    pub fn total_entries(&self) -> u64 {
        self.snapshot.total_entries
    }

    pub fn latest_entry(&self) -> Option<&Entry> {
        self.snapshot.latest_entry.as_ref()
    }

    pub fn last_lookup(&self) -> Option<&LookupResult> {
        self.last_lookup.as_ref()
    }

    // ── Operations ────────────────────────────────────────────────────────

    /// Load (or reload) the snapshot: entry count plus the entry at
    /// physical position `count - 1`.
    ///
    /// Remote failure is a recoverable condition: it is logged, the prior
    /// totals are kept (0 on the first call) and the view transitions to
    /// [`ViewPhase::Degraded`] instead of propagating the error.
    pub async fn load_snapshot(&mut self, contract: &ContractHandle) {
        self.phase = ViewPhase::Loading;

        match fetch_snapshot(contract).await {
            Ok(snapshot) => {
                debug!(
                    total_entries = snapshot.total_entries,
                    has_latest = snapshot.latest_entry.is_some(),
                    "snapshot loaded"
                );
                self.snapshot = snapshot;
                self.phase = ViewPhase::Ready;
            }
            Err(e) => {
                warn!(error = %e, "snapshot load failed; keeping previous totals");
                self.phase = ViewPhase::Degraded;
            }
        }
    }

    /// Resolve a user-supplied logical index against the remote store.
    ///
    /// The previously displayed result is cleared before anything else, so
    /// stale data is never shown during an in-flight fetch. Validation
    /// accepts the inclusive range `[0, total_entries]`; out-of-range input
    /// is reported as [`LedgerError::IndexOutOfRange`] without issuing a
    /// remote call. For accepted input the entry at physical position
    /// `raw_index - 1` is fetched; a remote failure (including the
    /// unencodable position -1 produced by logical index 0) is logged and
    /// leaves the result cleared rather than failing the caller.
    pub async fn lookup_by_index(
        &mut self,
        contract: &ContractHandle,
        raw_index: i64,
    ) -> Result<()> {
        // Clear the previous entry before the new fetch begins.
        self.last_lookup = None;
        self.lookup_generation += 1;
        let generation = self.lookup_generation;

        let total = self.snapshot.total_entries;
        if raw_index < 0 || raw_index as u64 > total {
            return Err(LedgerError::IndexOutOfRange {
                index: raw_index,
                total,
            });
        }

        match contract.entry_at(raw_index - 1).await {
            Ok(entry) => {
                debug!(index = raw_index, generation, "lookup resolved");
                self.last_lookup = Some(LookupResult {
                    generation,
                    requested_index: raw_index,
                    entry,
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, index = raw_index, "lookup fetch failed; result stays cleared");
                Ok(())
            }
        }
    }
}

/// One count call, plus one entry call when the ledger is non-empty.
async fn fetch_snapshot(contract: &ContractHandle) -> Result<DatasetSnapshot> {
    let count = contract.get_entries().await?;
    let latest_entry = if count > 0 {
        Some(contract.entry_at(count as i64 - 1).await?)
    } else {
        None
    };
    Ok(DatasetSnapshot {
        total_entries: count,
        latest_entry,
    })
}
