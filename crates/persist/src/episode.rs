//! Append-only action logs and deterministic replay.

use crate::snapshot::{cbor_deserialize, cbor_serialize, Snapshot, SnapshotError};
use gridworld_env::{Environment, ObservationFn, StepType};
use gridworld_kernel::State;
use serde::{Deserialize, Serialize};

/// Everything needed to reproduce an episode: the reset seed and the
/// actions taken, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeLog {
    pub seed: u64,
    actions: Vec<usize>,
}

impl EpisodeLog {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            actions: Vec::new(),
        }
    }

    pub fn with_actions(seed: u64, actions: Vec<usize>) -> Self {
        Self { seed, actions }
    }

    /// Append one action. Entries are never modified after writing.
    pub fn record(&mut self, action: usize) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        cbor_serialize(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        cbor_deserialize(data)
    }

    /// Reset `env` with the logged seed and apply every action.
    ///
    /// Replay stops at the first terminated or truncated timestep; actions
    /// logged past that point are not applied.
    pub fn replay<O: ObservationFn>(&self, env: &Environment<O>) -> Result<Replay, SnapshotError> {
        let _span = tracing::debug_span!("replay", seed = self.seed, actions = self.len()).entered();
        let first = env.reset(self.seed)?;
        let mut hashes = vec![first.state.state_hash()];
        let mut state = first.state;
        let mut total_reward = 0.0;
        let mut step_type = first.step_type;
        let mut applied = 0;

        for &action in &self.actions {
            if step_type != StepType::Ongoing {
                tracing::warn!(skipped = self.len() - applied, "episode ended before the log did");
                break;
            }
            let timestep = env.step(&state, action)?;
            hashes.push(timestep.state.state_hash());
            total_reward += timestep.reward;
            step_type = timestep.step_type;
            state = timestep.state;
            applied += 1;
        }

        Ok(Replay {
            hashes,
            total_reward,
            step_type,
            applied,
            final_state: state,
        })
    }
}

/// Result of replaying an [`EpisodeLog`].
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// `state_hash` of the reset state followed by one entry per applied step.
    pub hashes: Vec<u64>,
    pub total_reward: f32,
    pub step_type: StepType,
    pub applied: usize,
    pub final_state: State,
}

/// Outcome of [`verify_replay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub hashes_match: bool,
    pub digests_match: bool,
    /// Digest of the final state of the first run.
    pub digest: String,
}

impl ReplayReport {
    pub fn is_reproducible(&self) -> bool {
        self.hashes_match && self.digests_match
    }
}

/// Replay `log` twice through `env` and compare per-step state hashes and
/// the snapshot digests of the final states.
pub fn verify_replay<O: ObservationFn>(
    env: &Environment<O>,
    log: &EpisodeLog,
) -> Result<ReplayReport, SnapshotError> {
    let first = log.replay(env)?;
    let second = log.replay(env)?;
    let first_snapshot = Snapshot::capture(&first.final_state)?;
    let second_snapshot = Snapshot::capture(&second.final_state)?;

    let report = ReplayReport {
        steps: first.applied,
        hashes_match: first.hashes == second.hashes,
        digests_match: first_snapshot.digest == second_snapshot.digest,
        digest: first_snapshot.digest,
    };
    if !report.is_reproducible() {
        tracing::error!(?report, "replay diverged");
    }
    Ok(report)
}
