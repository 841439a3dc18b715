use gridworld_kernel::State;
use serde::{Deserialize, Serialize};

/// Where an episode stands after a timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Ongoing,
    /// The termination strategy fired.
    Terminated,
    /// The step budget ran out before termination.
    Truncated,
}

/// The output of `reset` and `step`. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestep<O> {
    /// Step index; equals `state.step()`.
    pub t: u64,
    pub observation: O,
    /// Action that produced this timestep. `None` is the reset sentinel.
    pub action: Option<usize>,
    pub reward: f32,
    pub step_type: StepType,
    pub state: State,
}

impl<O> Timestep<O> {
    pub fn is_terminated(&self) -> bool {
        self.step_type == StepType::Terminated
    }

    pub fn is_truncated(&self) -> bool {
        self.step_type == StepType::Truncated
    }

    /// Terminated or truncated; the driver should call `reset`.
    pub fn is_done(&self) -> bool {
        self.step_type != StepType::Ongoing
    }
}
