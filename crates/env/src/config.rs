//! YAML-backed environment configuration.

use crate::observations::{ObservationKind, MAX_VIEW_RADIUS};
use gridworld_common::GridError;
use gridworld_kernel::actions::table_by_name;
use gridworld_kernel::TransitionMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Which layout family an environment generates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Room,
    KeyDoor,
    DynamicObstacles,
}

/// Everything needed to build an [`Environment`](crate::Environment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    pub variant: Variant,
    pub height: usize,
    pub width: usize,
    pub max_steps: u64,
    /// `minigrid` or `complete`.
    pub actions: String,
    pub transition: TransitionMode,
    /// Only meaningful for [`Variant::DynamicObstacles`].
    pub balls: usize,
    pub observation: ObservationKind,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Room,
            height: 8,
            width: 8,
            max_steps: 100,
            actions: "minigrid".to_string(),
            transition: TransitionMode::Deterministic,
            balls: 0,
            observation: ObservationKind::Categorical,
        }
    }
}

impl EnvConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EnvConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be positive".into()));
        }
        if table_by_name(&self.actions).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown action table `{}` (expected `minigrid` or `complete`)",
                self.actions
            )));
        }
        if self.balls > 0 && self.variant != Variant::DynamicObstacles {
            return Err(ConfigError::Invalid(
                "balls are only placed by the dynamic_obstacles variant".into(),
            ));
        }
        if self.variant == Variant::DynamicObstacles && self.transition != TransitionMode::Stochastic {
            tracing::warn!("dynamic_obstacles with a deterministic transition: balls will not move");
        }
        if let ObservationKind::FirstPerson { radius } = self.observation {
            if radius == 0 || radius > MAX_VIEW_RADIUS {
                return Err(ConfigError::Invalid(format!(
                    "first_person radius must be between 1 and {MAX_VIEW_RADIUS}, got {radius}"
                )));
            }
        }
        Ok(())
    }
}
