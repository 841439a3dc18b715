//! Walkability predicates.
//!
//! Players move with [`can_occupy`]: goals, carried keys and open doors do
//! not stop them. Anything the engine places on its own, a ball relocated by
//! the stochastic pass or a key set down by a player, uses the stricter
//! [`can_spawn`], which rejects every cell an on-map entity stands on. Both
//! are evaluated against one fixed snapshot of the state.

use crate::entities::Kind;
use crate::state::State;
use gridworld_common::Position;
use std::collections::BTreeMap;

/// True iff the grid cell at `position` is walkable and no blocking entity of
/// `state` stands on it.
pub fn can_occupy(state: &State, position: Position) -> bool {
    state.grid().is_walkable(position) && !state.entities().is_blocked(position)
}

/// True iff the grid cell at `position` is walkable and no on-map entity of
/// `state` stands on it, blocking or not.
pub fn can_spawn(state: &State, position: Position) -> bool {
    state.grid().is_walkable(position) && state.entities().kind_at(position).is_none()
}

/// Cells shared by two or more blocking entities, in ascending order.
pub fn overlaps(state: &State) -> Vec<Position> {
    let mut counts: BTreeMap<Position, usize> = BTreeMap::new();
    for position in state.entities().blocking_positions() {
        *counts.entry(position).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(position, _)| position)
        .collect()
}

/// Placed entities standing on obstacle cells.
///
/// Walls are exempt: they may sit on the border by construction.
pub fn misplaced(state: &State) -> Vec<Position> {
    state
        .entities()
        .placed()
        .into_iter()
        .filter(|(kind, _)| *kind != Kind::Wall)
        .map(|(_, position)| position)
        .filter(|position| !state.grid().is_walkable(*position))
        .collect()
}
