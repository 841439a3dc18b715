//! Stock observation strategies.
//!
//! All three produce an [`ObservationGrid`]: a dense `height x width x channels`
//! array of cell codes. Code `0` is empty floor, `1` is an obstacle cell and
//! entity kinds start at `2` (see [`kind_code`]).

use crate::strategy::ObservationFn;
use gridworld_common::Position;
use gridworld_kernel::{DoorState, Kind, State};
use serde::{Deserialize, Serialize};

pub const EMPTY: u8 = 0;
pub const OBSTACLE: u8 = 1;

/// Largest first-person radius. Wider views are clamped to it.
pub const MAX_VIEW_RADIUS: usize = 32;

/// Observation code of an entity kind.
pub fn kind_code(kind: Kind) -> u8 {
    match kind {
        Kind::Player => 2,
        Kind::Goal => 3,
        Kind::Key => 4,
        Kind::Door => 5,
        Kind::Ball => 6,
        Kind::Wall => 7,
    }
}

/// Dense row-major observation tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationGrid {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl ObservationGrid {
    fn filled(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
            data: vec![EMPTY; height * width * channels],
        }
    }

    /// Value at `(row, col, channel)`; `None` out of range.
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<u8> {
        if row >= self.height || col >= self.width || channel >= self.channels {
            return None;
        }
        self.data
            .get((row * self.width + col) * self.channels + channel)
            .copied()
    }

    fn set(&mut self, row: usize, col: usize, values: &[u8]) {
        let start = (row * self.width + col) * self.channels;
        self.data[start..start + values.len()].copy_from_slice(values);
    }
}

/// One code per cell: the most salient entity, else the grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Categorical;

/// Three codes per cell: kind, state and heading.
///
/// State is `0/1/2` for open/closed/locked doors and `1` for a player
/// carrying a key. Heading is `direction index + 1` for players, `0` for
/// everything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Symbolic;

/// Categorical codes in an egocentric `(2r+1) x (2r+1)` window centred on
/// the player and rotated so that the player's heading points up.
/// Cells outside the grid read as [`OBSTACLE`]. The radius is capped at
/// [`MAX_VIEW_RADIUS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstPerson {
    pub radius: usize,
}

fn categorical_code(state: &State, position: Position) -> u8 {
    match state.entities().kind_at(position) {
        Some(kind) => kind_code(kind),
        None if state.grid().is_walkable(position) => EMPTY,
        None => OBSTACLE,
    }
}

fn symbolic_codes(state: &State, position: Position) -> [u8; 3] {
    let entities = state.entities();
    let Some(kind) = entities.kind_at(position) else {
        return [categorical_code(state, position), 0, 0];
    };
    let (status, heading) = match kind {
        Kind::Player => entities
            .players
            .iter()
            .find(|player| player.position == position)
            .map(|player| {
                (
                    u8::from(player.tag.held.is_some()),
                    player.direction.index() as u8 + 1,
                )
            })
            .unwrap_or((0, 0)),
        Kind::Door => entities
            .doors
            .iter()
            .find(|door| door.position == position)
            .map(|door| match door.tag.state {
                DoorState::Open => (0, 0),
                DoorState::Closed => (1, 0),
                DoorState::Locked => (2, 0),
            })
            .unwrap_or((0, 0)),
        _ => (0, 0),
    };
    [kind_code(kind), status, heading]
}

fn cell_at(row: usize, col: usize) -> Position {
    Position::new(row as i32, col as i32)
}

impl ObservationFn for Categorical {
    type Output = ObservationGrid;

    fn observe(&self, state: &State) -> ObservationGrid {
        let grid = state.grid();
        let mut out = ObservationGrid::filled(grid.height(), grid.width(), 1);
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                out.set(row, col, &[categorical_code(state, cell_at(row, col))]);
            }
        }
        out
    }
}

impl ObservationFn for Symbolic {
    type Output = ObservationGrid;

    fn observe(&self, state: &State) -> ObservationGrid {
        let grid = state.grid();
        let mut out = ObservationGrid::filled(grid.height(), grid.width(), 3);
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                out.set(row, col, &symbolic_codes(state, cell_at(row, col)));
            }
        }
        out
    }
}

impl ObservationFn for FirstPerson {
    type Output = ObservationGrid;

    fn observe(&self, state: &State) -> ObservationGrid {
        let radius = self.radius.min(MAX_VIEW_RADIUS);
        let side = 2 * radius + 1;
        let mut out = ObservationGrid::filled(side, side, 1);
        let Some(player) = state.player() else {
            out.data.fill(OBSTACLE);
            return out;
        };
        let (forward_row, forward_col) = player.direction.delta();
        let (right_row, right_col) = player.direction.rotate_cw().delta();
        let r = radius as i32;
        for row in 0..side {
            for col in 0..side {
                let ahead = r - row as i32;
                let right = col as i32 - r;
                let position = Position::new(
                    player.position.row + ahead * forward_row + right * right_row,
                    player.position.col + ahead * forward_col + right * right_col,
                );
                out.set(row, col, &[categorical_code(state, position)]);
            }
        }
        out
    }
}

/// Runtime-selectable observation, as named in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    #[default]
    Categorical,
    Symbolic,
    FirstPerson { radius: usize },
}

impl ObservationFn for ObservationKind {
    type Output = ObservationGrid;

    fn observe(&self, state: &State) -> ObservationGrid {
        match *self {
            ObservationKind::Categorical => Categorical.observe(state),
            ObservationKind::Symbolic => Symbolic.observe(state),
            ObservationKind::FirstPerson { radius } => FirstPerson { radius }.observe(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridworld_common::{Direction, Seed};
    use gridworld_kernel::{Batch, DoorTag, Entity, EntityTable, Grid, Pocket};
    use std::sync::Arc;

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    fn state(direction: Direction) -> State {
        let entities = EntityTable {
            players: Batch::single(Entity {
                position: p(1, 1),
                direction,
                tag: Pocket { held: Some(0) },
            }),
            goals: Batch::at(vec![p(3, 3)]),
            doors: Batch::new(
                vec![p(2, 3)],
                vec![Direction::East],
                vec![DoorTag {
                    state: DoorState::Locked,
                    requires: 0,
                }],
            ),
            ..EntityTable::default()
        };
        State::new(Arc::new(Grid::room(5, 5).unwrap()), entities, Seed::new(0))
    }

    #[test]
    fn categorical_marks_border_floor_and_entities() {
        let obs = Categorical.observe(&state(Direction::East));
        assert_eq!((obs.height, obs.width, obs.channels), (5, 5, 1));
        assert_eq!(obs.get(0, 0, 0), Some(OBSTACLE));
        assert_eq!(obs.get(2, 2, 0), Some(EMPTY));
        assert_eq!(obs.get(1, 1, 0), Some(kind_code(Kind::Player)));
        assert_eq!(obs.get(3, 3, 0), Some(kind_code(Kind::Goal)));
        assert_eq!(obs.get(2, 3, 0), Some(kind_code(Kind::Door)));
    }

    #[test]
    fn symbolic_encodes_state_and_heading() {
        let obs = Symbolic.observe(&state(Direction::South));
        assert_eq!(obs.channels, 3);
        assert_eq!(obs.get(1, 1, 1), Some(1));
        assert_eq!(obs.get(1, 1, 2), Some(Direction::South.index() as u8 + 1));
        assert_eq!(obs.get(2, 3, 0), Some(kind_code(Kind::Door)));
        assert_eq!(obs.get(2, 3, 1), Some(2));
        assert_eq!(obs.get(3, 3, 2), Some(0));
    }

    #[test]
    fn first_person_faces_up() {
        let view = FirstPerson { radius: 1 };
        let centre = 1;

        let north = view.observe(&state(Direction::North));
        assert_eq!((north.height, north.width), (3, 3));
        assert_eq!(north.get(centre, centre, 0), Some(kind_code(Kind::Player)));
        assert_eq!(north.get(0, centre, 0), Some(OBSTACLE));

        // Facing east, the floor at (1, 2) is straight ahead and the border
        // at (0, 1) is on the left.
        let east = view.observe(&state(Direction::East));
        assert_eq!(east.get(0, centre, 0), Some(EMPTY));
        assert_eq!(east.get(centre, 0, 0), Some(OBSTACLE));
        assert_eq!(east.get(centre, 2, 0), Some(EMPTY));
    }

    #[test]
    fn first_person_reads_outside_as_obstacle() {
        let obs = FirstPerson { radius: 3 }.observe(&state(Direction::West));
        // Three cells behind a player at column 1 facing west is column 4,
        // the border; three ahead is column -2, off the grid.
        assert_eq!(obs.get(6, 3, 0), Some(OBSTACLE));
        assert_eq!(obs.get(0, 3, 0), Some(OBSTACLE));
    }

    #[test]
    fn oversized_radius_is_clamped() {
        let obs = FirstPerson { radius: usize::MAX }.observe(&state(Direction::North));
        assert_eq!(obs.width, 2 * MAX_VIEW_RADIUS + 1);
        let centre = MAX_VIEW_RADIUS;
        assert_eq!(obs.get(centre, centre, 0), Some(kind_code(Kind::Player)));
    }

    #[test]
    fn kind_selection_dispatches() {
        let s = state(Direction::East);
        assert_eq!(ObservationKind::Symbolic.observe(&s), Symbolic.observe(&s));
        assert_eq!(
            ObservationKind::FirstPerson { radius: 2 }.observe(&s).width,
            5
        );
    }
}
