//! Seeded episode generators.
//!
//! # Invariants
//! - A layout is a pure function of its seed: equal seeds give equal states.
//! - Every generated state satisfies the occupancy invariant.
//! - The seed handed to the returned state is a child the layout never drew from.

use gridworld_common::{Direction, GridError, Position, Result, Seed};
use gridworld_kernel::grid::{random_directions, random_positions, random_positions_where};
use gridworld_kernel::{Batch, DoorState, DoorTag, Entity, EntityTable, Grid, KeyTag, Pocket, State};
use std::sync::Arc;

/// Builds the initial state of an episode.
pub trait Layout: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, seed: Seed) -> Result<State>;
}

fn player_at(position: Position, direction: Direction) -> Batch<Pocket> {
    Batch::single(Entity {
        position,
        direction,
        tag: Pocket::default(),
    })
}

/// Empty room with one player and one goal at random distinct cells.
#[derive(Debug, Clone)]
pub struct Room {
    grid: Arc<Grid>,
}

impl Room {
    pub fn new(height: usize, width: usize) -> Result<Self> {
        Ok(Self {
            grid: Arc::new(Grid::room(height, width)?),
        })
    }
}

impl Layout for Room {
    fn name(&self) -> &'static str {
        "room"
    }

    fn generate(&self, seed: Seed) -> Result<State> {
        let [carry, cells, heading] = seed.split_array();
        let cells = random_positions(cells, &self.grid, 2)?;
        let direction = random_directions(heading, 1)[0];
        let entities = EntityTable {
            players: player_at(cells[0], direction),
            goals: Batch::at(vec![cells[1]]),
            ..EntityTable::default()
        };
        Ok(State::new(Arc::clone(&self.grid), entities, carry))
    }
}

/// Smallest height or width of a key-door room.
pub const KEY_DOOR_MIN_DIMENSION: usize = 5;

/// Two chambers split by a wall column with a single locked door.
///
/// The player and the key start in the left chamber, the goal sits in the
/// right one. The wall column and the door row are drawn from the seed.
#[derive(Debug, Clone)]
pub struct KeyDoor {
    grid: Arc<Grid>,
}

impl KeyDoor {
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height < KEY_DOOR_MIN_DIMENSION || width < KEY_DOOR_MIN_DIMENSION {
            return Err(GridError::InvalidGridDimensions {
                height,
                width,
                minimum: KEY_DOOR_MIN_DIMENSION,
            });
        }
        Ok(Self {
            grid: Arc::new(Grid::room(height, width)?),
        })
    }
}

impl Layout for KeyDoor {
    fn name(&self) -> &'static str {
        "key_door"
    }

    fn generate(&self, seed: Seed) -> Result<State> {
        let [carry, wall, door, left, right, heading] = seed.split_array();
        let (height, width) = (self.grid.height() as i32, self.grid.width() as i32);

        // Columns 2..=width-3 leave at least one interior column on each side.
        let wall_col = 2 + wall.below((width - 4) as u64) as i32;
        let door_row = 1 + door.below((height - 2) as u64) as i32;

        let left = random_positions_where(left, &self.grid, 2, |p| p.col < wall_col)?;
        let goal = random_positions_where(right, &self.grid, 1, |p| p.col > wall_col)?;
        let direction = random_directions(heading, 1)[0];

        let walls = (1..height - 1)
            .filter(|row| *row != door_row)
            .map(|row| Position::new(row, wall_col))
            .collect();
        let door = Position::new(door_row, wall_col);
        let entities = EntityTable {
            players: player_at(left[0], direction),
            goals: Batch::at(goal),
            keys: Batch::new(
                vec![left[1]],
                vec![direction],
                vec![KeyTag {
                    id: 0,
                    carried: false,
                }],
            ),
            doors: Batch::new(
                vec![door],
                vec![Direction::East],
                vec![DoorTag {
                    state: DoorState::Locked,
                    requires: 0,
                }],
            ),
            walls: Batch::at(walls),
            ..EntityTable::default()
        };
        tracing::trace!(wall_col, door_row, "key-door layout");
        Ok(State::new(Arc::clone(&self.grid), entities, carry))
    }
}

/// Room with a player, a goal and `balls` randomly wandering obstacles.
#[derive(Debug, Clone)]
pub struct DynamicObstacles {
    grid: Arc<Grid>,
    balls: usize,
}

impl DynamicObstacles {
    pub fn new(height: usize, width: usize, balls: usize) -> Result<Self> {
        Ok(Self {
            grid: Arc::new(Grid::room(height, width)?),
            balls,
        })
    }
}

impl Layout for DynamicObstacles {
    fn name(&self) -> &'static str {
        "dynamic_obstacles"
    }

    fn generate(&self, seed: Seed) -> Result<State> {
        let [carry, cells, heading] = seed.split_array();
        let cells = random_positions(cells, &self.grid, 2 + self.balls)?;
        let direction = random_directions(heading, 1)[0];
        let entities = EntityTable {
            players: player_at(cells[0], direction),
            goals: Batch::at(vec![cells[1]]),
            balls: Batch::at(cells[2..].to_vec()),
            ..EntityTable::default()
        };
        Ok(State::new(Arc::clone(&self.grid), entities, carry))
    }
}
