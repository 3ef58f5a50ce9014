//! Runtime layer for the casting ledger client.
//!
//! Owns the observable dataset state (entry count, latest entry, last
//! lookup) and the index-resolution rules against the remote store.

pub mod dataset_view;

pub use casting_client as client;
pub use casting_core as core;
pub use dataset_view::{DatasetView, LookupResult, ViewPhase};
