//! The reset/step orchestrator.
//!
//! # Invariants
//! - `reset` consumes exactly one root seed; `step` consumes only the seed
//!   carried by the state.
//! - Termination takes precedence over truncation.
//! - An environment holds no episode state: the caller threads `State`.

use crate::config::{ConfigError, EnvConfig, Variant};
use crate::layouts::{DynamicObstacles, KeyDoor, Layout, Room};
use crate::observations::ObservationKind;
use crate::rewards;
use crate::strategy::{ObservationFn, RewardFn, TerminationFn};
use crate::terminations;
use crate::timestep::{StepType, Timestep};
use gridworld_common::{Result, Seed};
use gridworld_kernel::actions::table_by_name;
use gridworld_kernel::{transition, ActionTable, State, TransitionMode, MINIGRID};

/// Default step budget of an episode.
pub const DEFAULT_MAX_STEPS: u64 = 100;

/// A configured environment. Cheap to share across threads when its
/// observation strategy is.
pub struct Environment<O> {
    layout: Box<dyn Layout>,
    actions: ActionTable,
    mode: TransitionMode,
    max_steps: u64,
    observation: O,
    reward: Box<dyn RewardFn>,
    termination: Box<dyn TerminationFn>,
}

impl<O: ObservationFn> Environment<O> {
    pub fn builder<L: Layout + 'static>(layout: L, observation: O) -> EnvironmentBuilder<O> {
        EnvironmentBuilder {
            layout: Box::new(layout),
            actions: MINIGRID,
            mode: TransitionMode::Deterministic,
            max_steps: DEFAULT_MAX_STEPS,
            observation,
            reward: Box::new(rewards::navigation),
            termination: Box::new(terminations::on_goal_reached),
        }
    }

    /// Start an episode from a user-supplied seed.
    pub fn reset(&self, seed: u64) -> Result<Timestep<O::Output>> {
        let state = self.layout.generate(Seed::new(seed))?;
        tracing::debug!(layout = self.layout.name(), seed, hash = state.state_hash(), "reset");
        Ok(Timestep {
            t: 0,
            observation: self.observation.observe(&state),
            action: None,
            reward: 0.0,
            step_type: StepType::Ongoing,
            state,
        })
    }

    /// Advance `state` by one action.
    ///
    /// Stepping a state whose episode already ended is allowed; the driver
    /// is expected to call [`reset`](Self::reset) instead.
    pub fn step(&self, state: &State, action: usize) -> Result<Timestep<O::Output>> {
        let name = self.actions.get(action)?.name;
        let next = transition(state, action, &self.actions, self.mode)?;
        let next = next.with_step(state.step() + 1);

        let reward = self.reward.reward(state, action, &next);
        let step_type = if self.termination.is_terminal(state, action, &next) {
            StepType::Terminated
        } else if next.step() >= self.max_steps {
            StepType::Truncated
        } else {
            StepType::Ongoing
        };
        tracing::debug!(
            t = next.step(),
            action = name,
            reward,
            ?step_type,
            player = ?next.player_position(),
            "step"
        );
        Ok(Timestep {
            t: next.step(),
            observation: self.observation.observe(&next),
            action: Some(action),
            reward,
            step_type,
            state: next,
        })
    }

    pub fn action_table(&self) -> &ActionTable {
        &self.actions
    }

    pub fn transition_mode(&self) -> TransitionMode {
        self.mode
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    pub fn layout_name(&self) -> &'static str {
        self.layout.name()
    }
}

impl Environment<ObservationKind> {
    /// Build the stock environment a configuration describes.
    ///
    /// Room and key-door use navigation reward and end on the goal;
    /// dynamic obstacles additionally penalise and end on a ball hit.
    pub fn from_config(config: &EnvConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let actions = table_by_name(&config.actions).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown action table `{}`", config.actions))
        })?;
        let (height, width) = (config.height, config.width);
        let builder = match config.variant {
            Variant::Room => Environment::builder(Room::new(height, width)?, config.observation),
            Variant::KeyDoor => Environment::builder(KeyDoor::new(height, width)?, config.observation),
            Variant::DynamicObstacles => {
                let layout = DynamicObstacles::new(height, width, config.balls)?;
                let forward = actions.index_of("forward").ok_or_else(|| {
                    ConfigError::Invalid(format!("action table `{}` has no forward", actions.name()))
                })?;
                Environment::builder(layout, config.observation)
                    .reward(rewards::sum(
                        rewards::navigation,
                        rewards::ball_hit_penalty(forward),
                    ))
                    .termination(terminations::any(
                        terminations::on_goal_reached,
                        terminations::on_ball_hit(forward),
                    ))
            }
        };
        builder
            .actions(actions)
            .transition_mode(config.transition)
            .max_steps(config.max_steps)
            .build()
    }
}

/// Incremental construction of an [`Environment`].
pub struct EnvironmentBuilder<O> {
    layout: Box<dyn Layout>,
    actions: ActionTable,
    mode: TransitionMode,
    max_steps: u64,
    observation: O,
    reward: Box<dyn RewardFn>,
    termination: Box<dyn TerminationFn>,
}

impl<O: ObservationFn> EnvironmentBuilder<O> {
    pub fn actions(mut self, actions: ActionTable) -> Self {
        self.actions = actions;
        self
    }

    pub fn transition_mode(mut self, mode: TransitionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn reward<R: RewardFn + 'static>(mut self, reward: R) -> Self {
        self.reward = Box::new(reward);
        self
    }

    pub fn termination<T: TerminationFn + 'static>(mut self, termination: T) -> Self {
        self.termination = Box::new(termination);
        self
    }

    pub fn observation<P: ObservationFn>(self, observation: P) -> EnvironmentBuilder<P> {
        EnvironmentBuilder {
            layout: self.layout,
            actions: self.actions,
            mode: self.mode,
            max_steps: self.max_steps,
            observation,
            reward: self.reward,
            termination: self.termination,
        }
    }

    /// Fails on an empty action table or a zero step budget.
    pub fn build(self) -> std::result::Result<Environment<O>, ConfigError> {
        if self.actions.is_empty() {
            return Err(ConfigError::Invalid("action table is empty".into()));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be positive".into()));
        }
        Ok(Environment {
            layout: self.layout,
            actions: self.actions,
            mode: self.mode,
            max_steps: self.max_steps,
            observation: self.observation,
            reward: self.reward,
            termination: self.termination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridworld_common::GridError;
    use gridworld_kernel::actions::minigrid;

    fn room() -> Environment<ObservationKind> {
        Environment::from_config(&EnvConfig::default()).unwrap()
    }

    #[test]
    fn reset_produces_an_ongoing_first_timestep() {
        let first = room().reset(0).unwrap();
        assert_eq!(first.t, 0);
        assert_eq!(first.action, None);
        assert_eq!(first.reward, 0.0);
        assert_eq!(first.step_type, StepType::Ongoing);
        assert_eq!(first.state.step(), 0);
    }

    #[test]
    fn step_counts_and_truncates() {
        let env = Environment::builder(Room::new(6, 6).unwrap(), ObservationKind::Categorical)
            .termination(terminations::never)
            .max_steps(3)
            .build()
            .unwrap();
        let mut timestep = env.reset(5).unwrap();
        for expected in 1..=3 {
            timestep = env.step(&timestep.state, minigrid::DONE).unwrap();
            assert_eq!(timestep.t, expected);
            assert_eq!(timestep.action, Some(minigrid::DONE));
        }
        assert!(timestep.is_truncated());
    }

    #[test]
    fn invalid_action_is_an_error() {
        let env = room();
        let first = env.reset(0).unwrap();
        assert_eq!(
            env.step(&first.state, 7).unwrap_err(),
            GridError::InvalidAction { index: 7, len: 7 }
        );
    }

    #[test]
    fn config_errors_surface() {
        let config = EnvConfig {
            height: 2,
            ..EnvConfig::default()
        };
        assert!(matches!(
            Environment::from_config(&config),
            Err(ConfigError::Grid(GridError::InvalidGridDimensions { .. }))
        ));
    }

    #[test]
    fn zero_step_budget_is_rejected() {
        let built = Environment::builder(Room::new(5, 5).unwrap(), ObservationKind::Categorical)
            .max_steps(0)
            .build();
        assert!(matches!(built, Err(ConfigError::Invalid(message)) if message.contains("max_steps")));
    }

    #[test]
    fn custom_observation_closure() {
        let observe = |state: &State| state.player_position();
        let env = Environment::builder(Room::new(5, 5).unwrap(), observe)
            .build()
            .unwrap();
        let first = env.reset(1).unwrap();
        assert_eq!(first.observation, first.state.player_position());
    }
}
