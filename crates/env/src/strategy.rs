//! Capability traits consumed by the orchestrator.
//!
//! Each trait has a blanket implementation for plain functions and closures
//! of the matching signature, so `fn navigation(&State, usize, &State) -> f32`
//! is a reward strategy as-is.

use gridworld_kernel::State;

/// Turns a state into whatever the agent gets to see.
pub trait ObservationFn {
    type Output;

    fn observe(&self, state: &State) -> Self::Output;
}

impl<F, O> ObservationFn for F
where
    F: Fn(&State) -> O,
{
    type Output = O;

    fn observe(&self, state: &State) -> O {
        self(state)
    }
}

/// Scalar feedback for the transition `prev --action--> next`.
pub trait RewardFn: Send + Sync {
    fn reward(&self, prev: &State, action: usize, next: &State) -> f32;
}

impl<F> RewardFn for F
where
    F: Fn(&State, usize, &State) -> f32 + Send + Sync,
{
    fn reward(&self, prev: &State, action: usize, next: &State) -> f32 {
        self(prev, action, next)
    }
}

/// Whether the transition `prev --action--> next` ends the episode.
pub trait TerminationFn: Send + Sync {
    fn is_terminal(&self, prev: &State, action: usize, next: &State) -> bool;
}

impl<F> TerminationFn for F
where
    F: Fn(&State, usize, &State) -> bool + Send + Sync,
{
    fn is_terminal(&self, prev: &State, action: usize, next: &State) -> bool {
        self(prev, action, next)
    }
}
