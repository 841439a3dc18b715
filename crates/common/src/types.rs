use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on the grid: `row` grows downward, `col` grows rightward.
///
/// Coordinates are signed so that translating off the edge of the map yields a
/// representable (but unwalkable) cell instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell one step away in `direction`. No bounds checks.
    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four discrete headings.
///
/// The discriminants are the public direction indices: clockwise from East.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// Heading for an index, taken modulo 4.
    pub fn from_index(index: u64) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// `(row, col)` offset of a single step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::North => (-1, 0),
        }
    }

    pub fn rotate_cw(self) -> Self {
        Self::from_index(self as u64 + 1)
    }

    pub fn rotate_ccw(self) -> Self {
        Self::from_index(self as u64 + 3)
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self as u64 + 2)
    }
}
