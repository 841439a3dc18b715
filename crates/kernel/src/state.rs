use crate::entities::{Entity, EntityTable, Pocket};
use crate::grid::Grid;
use gridworld_common::{Position, Result, Seed};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The complete world at one instant.
///
/// A `State` is a value. Transforms take `&State` and return a new one; the
/// grid is shared behind an `Arc` so copies stay cheap and the map can never
/// be mutated through a state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    grid: Arc<Grid>,
    entities: EntityTable,
    /// Carried between steps; only the stochastic pass splits it.
    seed: Seed,
    step: u64,
}

impl State {
    /// A state at step 0.
    pub fn new(grid: Arc<Grid>, entities: EntityTable, seed: Seed) -> Self {
        Self {
            grid,
            entities,
            seed,
            step: 0,
        }
    }

    /// Structural check for states that bypassed the constructors, such as
    /// those decoded from a snapshot.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.entities.validate()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Shared handle to the grid, for building sibling states.
    pub fn grid_handle(&self) -> Arc<Grid> {
        Arc::clone(&self.grid)
    }

    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Number of `step` calls since the last reset.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// The first player, the agent driven by the action table.
    pub fn player(&self) -> Option<Entity<Pocket>> {
        self.entities.players.get(0)
    }

    pub fn player_position(&self) -> Option<Position> {
        self.entities.players.positions().first().copied()
    }

    pub fn with_entities(&self, entities: EntityTable) -> Self {
        Self {
            entities,
            ..self.clone()
        }
    }

    pub fn with_seed(&self, seed: Seed) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    pub fn with_step(&self, step: u64) -> Self {
        Self {
            step,
            ..self.clone()
        }
    }

    /// Compute a deterministic hash of the state for comparison across runs.
    /// Fields are visited in a fixed canonical order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_cells = |h: &mut u64, positions: &[Position]| {
            mix(h, &(positions.len() as u64).to_le_bytes());
            for p in positions {
                mix(h, &p.row.to_le_bytes());
                mix(h, &p.col.to_le_bytes());
            }
        };
        mix(&mut h, &self.step.to_le_bytes());
        mix(&mut h, &self.seed.key().to_le_bytes());
        mix(&mut h, &(self.grid.height() as u64).to_le_bytes());
        mix(&mut h, &(self.grid.width() as u64).to_le_bytes());

        let e = &self.entities;
        mix_cells(&mut h, e.players.positions());
        for (direction, pocket) in e.players.directions().iter().zip(e.players.tags()) {
            mix(&mut h, &[*direction as u8]);
            mix(&mut h, &pocket.held.map_or(u64::MAX, u64::from).to_le_bytes());
        }
        mix_cells(&mut h, e.goals.positions());
        mix_cells(&mut h, e.keys.positions());
        for key in e.keys.tags() {
            mix(&mut h, &key.id.to_le_bytes());
            mix(&mut h, &[key.carried as u8]);
        }
        mix_cells(&mut h, e.doors.positions());
        for door in e.doors.tags() {
            mix(&mut h, &[door.state as u8]);
            mix(&mut h, &door.requires.to_le_bytes());
        }
        mix_cells(&mut h, e.balls.positions());
        mix_cells(&mut h, e.walls.positions());
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Batch;
    use gridworld_common::Direction;

    fn sample(seed: u64) -> State {
        let grid = Arc::new(Grid::room(6, 6).unwrap());
        let entities = EntityTable {
            players: Batch::single(Entity {
                position: Position::new(1, 1),
                direction: Direction::East,
                tag: Pocket::default(),
            }),
            goals: Batch::at(vec![Position::new(4, 4)]),
            ..EntityTable::default()
        };
        State::new(grid, entities, Seed::new(seed))
    }

    #[test]
    fn new_state_starts_at_step_zero() {
        let state = sample(0);
        assert_eq!(state.step(), 0);
        assert_eq!(state.player_position(), Some(Position::new(1, 1)));
        assert_eq!(state.validate(), Ok(()));
    }

    #[test]
    fn replace_updates_leave_original_untouched() {
        let state = sample(0);
        let later = state.with_step(5);
        assert_eq!(state.step(), 0);
        assert_eq!(later.step(), 5);
        assert!(Arc::ptr_eq(&state.grid_handle(), &later.grid_handle()));
    }

    #[test]
    fn state_hash_deterministic() {
        assert_eq!(sample(42).state_hash(), sample(42).state_hash());
    }

    #[test]
    fn state_hash_sees_seed_step_and_entities() {
        let base = sample(1);
        assert_ne!(base.state_hash(), sample(2).state_hash());
        assert_ne!(base.state_hash(), base.with_step(1).state_hash());

        let mut entities = base.entities().clone();
        entities.goals = entities.goals.with_positions(vec![Position::new(3, 3)]);
        assert_ne!(base.state_hash(), base.with_entities(entities).state_hash());
    }
}
