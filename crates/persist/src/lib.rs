//! Persistence helpers: content-addressed state snapshots and episode logs.
//!
//! # Invariants
//! - Snapshots are content-addressed and verifiable: the digest is the
//!   SHA-256 of the CBOR encoding of the state.
//! - Restoring a snapshot yields a state equal to the one captured.
//! - An episode log is append-only; replaying it through the same
//!   environment reproduces the same states.

pub mod episode;
pub mod snapshot;

pub use episode::{verify_replay, EpisodeLog, Replay, ReplayReport};
pub use snapshot::{Snapshot, SnapshotError};

pub fn crate_info() -> &'static str {
    "gridworld-persist v0.1.0"
}
