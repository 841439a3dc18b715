//! Episode orchestration on top of the gridworld kernel.
//!
//! An [`Environment`] couples a [`Layout`] (initial states), an action table,
//! a transition mode and three strategies (observation, reward, termination)
//! into the gym-style `reset`/`step` pair that produces [`Timestep`]s.
//!
//! # Invariants
//! - `reset(seed)` is a pure function of `seed`.
//! - `step` is a pure function of its inputs; all randomness comes from the
//!   seed carried by the state.
//! - Every state produced satisfies the occupancy invariant.

pub mod config;
pub mod environment;
pub mod layouts;
pub mod observations;
pub mod rewards;
pub mod strategy;
pub mod terminations;
pub mod timestep;

pub use config::{ConfigError, EnvConfig, Variant};
pub use environment::{Environment, EnvironmentBuilder};
pub use layouts::{DynamicObstacles, KeyDoor, Layout, Room};
pub use observations::{Categorical, FirstPerson, ObservationGrid, ObservationKind, Symbolic};
pub use strategy::{ObservationFn, RewardFn, TerminationFn};
pub use timestep::{StepType, Timestep};

pub fn crate_info() -> &'static str {
    "gridworld-env v0.1.0"
}
