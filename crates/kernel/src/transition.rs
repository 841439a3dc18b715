//! State transitions: the deterministic action dispatch and the optional
//! stochastic pass for mobile entities.
//!
//! # Invariants
//! - [`apply`] never touches the seed carried by the state.
//! - [`stochastic_step`] reads one snapshot, fixed at pass entry, for every
//!   occupancy check it performs.
//! - Each random draw consumes its own child seed; the state's seed is
//!   replaced by a fresh sibling after the pass.

use crate::actions::ActionTable;
use crate::entities::translate;
use crate::occupancy::can_spawn;
use crate::state::State;
use gridworld_common::{Direction, Position, Result, Seed};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Candidate moves tried per mobile entity before it stays put.
pub const MAX_MOVE_ATTEMPTS: usize = 3;

/// Which transition pipeline a step runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Action dispatch only.
    #[default]
    Deterministic,
    /// Action dispatch followed by [`stochastic_step`].
    Stochastic,
}

/// Apply exactly one action from `table`, selected by index.
pub fn apply(state: &State, action: usize, table: &ActionTable) -> Result<State> {
    let entry = table.get(action)?;
    Ok((entry.apply)(state))
}

/// Run the pipeline selected by `mode`.
pub fn transition(
    state: &State,
    action: usize,
    table: &ActionTable,
    mode: TransitionMode,
) -> Result<State> {
    let next = apply(state, action, table)?;
    Ok(match mode {
        TransitionMode::Deterministic => next,
        TransitionMode::Stochastic => stochastic_step(&next),
    })
}

/// Relocate every ball with up to [`MAX_MOVE_ATTEMPTS`] random moves.
///
/// Each ball gets its own child seed and proposes a target against the
/// pass-entry snapshot, independently of every other ball. A target must be
/// free of every on-map entity, goals and open doors included. Two balls may
/// propose the same cell; [`reconcile`] then settles the proposals in batch
/// index order.
pub fn stochastic_step(state: &State) -> State {
    let balls = &state.entities().balls;
    if balls.is_empty() {
        return state.clone();
    }
    let _span = tracing::trace_span!("stochastic_step", balls = balls.len()).entered();

    let (carry, pass) = state.seed().clone().split();
    let proposals: Vec<Position> = balls
        .positions()
        .iter()
        .zip(pass.split_n(balls.len()))
        .map(|(origin, seed)| propose_move(state, *origin, seed))
        .collect();

    let resolved = reconcile(balls.positions(), proposals);
    let mut entities = state.entities().clone();
    entities.balls = balls.with_positions(resolved);
    state.with_entities(entities).with_seed(carry)
}

/// Settle independent proposals in index order.
///
/// A ball that stays is always kept. A ball that moves takes its target only
/// if no lower-indexed ball claimed the same cell first; otherwise it keeps
/// its origin.
pub fn reconcile(origins: &[Position], proposals: Vec<Position>) -> Vec<Position> {
    let mut claimed = BTreeSet::new();
    origins
        .iter()
        .zip(proposals)
        .enumerate()
        .map(|(index, (origin, target))| {
            if target == *origin || claimed.insert(target) {
                target
            } else {
                tracing::trace!(index, %target, "target already claimed; ball stays");
                *origin
            }
        })
        .collect()
}

/// First legal target among independent random headings, or `origin`.
fn propose_move(snapshot: &State, origin: Position, seed: Seed) -> Position {
    for attempt in seed.split_n(MAX_MOVE_ATTEMPTS) {
        let heading = Direction::from_index(attempt.below(4));
        let candidate = translate(origin, heading);
        if can_spawn(snapshot, candidate) {
            return candidate;
        }
    }
    tracing::trace!(%origin, "no legal move; ball stays");
    origin
}
