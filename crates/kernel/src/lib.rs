//! Gridworld kernel: the static map, typed entity batches, the occupancy
//! predicate and the state transitions.
//!
//! # Invariants
//! - Transitions are pure: they take a [`State`] and return a new one.
//! - The action dispatch consumes no randomness.
//! - Player moves are checked with [`occupancy::can_occupy`]; anything the
//!   engine places itself is checked with [`occupancy::can_spawn`].

pub mod actions;
pub mod entities;
pub mod grid;
pub mod occupancy;
pub mod state;
pub mod transition;

pub use actions::{ActionFn, ActionTable, NamedAction, COMPLETE, MINIGRID};
pub use entities::{Batch, DoorState, DoorTag, Entity, EntityTable, KeyId, KeyTag, Kind, Pocket};
pub use grid::Grid;
pub use state::State;
pub use transition::{apply, stochastic_step, transition, TransitionMode};

pub fn crate_info() -> &'static str {
    "gridworld-kernel v0.1.0"
}
