//! Static map construction and seeded placement samplers.

use gridworld_common::{Direction, GridError, Position, Result, Seed};
use serde::{Deserialize, Serialize};

/// Smallest legal height or width: a one-cell interior plus the border.
pub const MIN_DIMENSION: usize = 3;

/// Cell value of a walkable cell. Anything else is an obstacle.
pub const WALKABLE: u8 = 0;
/// Cell value used for the border frame.
pub const OBSTACLE: u8 = 1;

/// Immutable `height x width` field of cell values in row-major order.
///
/// Built once per layout and shared by reference between states. There is no
/// mutating API: variants that need extra obstacles construct a new grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// An all-walkable interior surrounded by a one-cell obstacle frame.
    pub fn room(height: usize, width: usize) -> Result<Self> {
        if height < MIN_DIMENSION || width < MIN_DIMENSION {
            return Err(GridError::InvalidGridDimensions {
                height,
                width,
                minimum: MIN_DIMENSION,
            });
        }
        let mut cells = vec![WALKABLE; height * width];
        for row in 0..height {
            for col in 0..width {
                if row == 0 || col == 0 || row == height - 1 || col == width - 1 {
                    cells[row * width + col] = OBSTACLE;
                }
            }
        }
        Ok(Self {
            height,
            width,
            cells,
        })
    }

    /// Check a grid that did not come from a constructor, e.g. one decoded
    /// from bytes: legal dimensions and exactly `height * width` cells.
    pub fn validate(&self) -> Result<()> {
        if self.height < MIN_DIMENSION || self.width < MIN_DIMENSION {
            return Err(GridError::InvalidGridDimensions {
                height: self.height,
                width: self.width,
                minimum: MIN_DIMENSION,
            });
        }
        let expected = self.height.checked_mul(self.width).unwrap_or(usize::MAX);
        if self.cells.len() != expected {
            return Err(GridError::ShapeMismatch {
                what: "grid cells",
                expected,
                actual: self.cells.len(),
            });
        }
        Ok(())
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell value at `position`, or `None` outside the field.
    pub fn get(&self, position: Position) -> Option<u8> {
        self.index(position).and_then(|index| self.cells.get(index).copied())
    }

    /// Out-of-field positions are never walkable.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.get(position) == Some(WALKABLE)
    }

    /// Walkable cells in row-major order.
    pub fn walkable_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == WALKABLE)
            .map(|(index, _)| Position::new((index / self.width) as i32, (index % self.width) as i32))
            .collect()
    }

    fn index(&self, position: Position) -> Option<usize> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        (row < self.height && col < self.width).then_some(row * self.width + col)
    }
}

/// `n` distinct walkable cells, sampled without replacement.
pub fn random_positions(seed: Seed, grid: &Grid, n: usize) -> Result<Vec<Position>> {
    random_positions_where(seed, grid, n, |_| true)
}

/// Like [`random_positions`], restricted to walkable cells accepted by `filter`.
///
/// Runs a partial Fisher-Yates shuffle over the candidate list, one child seed
/// per swap, so the cost is bounded by the number of candidates.
pub fn random_positions_where<F>(
    seed: Seed,
    grid: &Grid,
    n: usize,
    filter: F,
) -> Result<Vec<Position>>
where
    F: Fn(Position) -> bool,
{
    let mut candidates: Vec<Position> = grid
        .walkable_cells()
        .into_iter()
        .filter(|position| filter(*position))
        .collect();
    if n > candidates.len() {
        return Err(GridError::InsufficientFreeCells {
            requested: n,
            available: candidates.len(),
        });
    }
    for (slot, draw) in seed.split_n(n).into_iter().enumerate() {
        let remaining = (candidates.len() - slot) as u64;
        let pick = slot + draw.below(remaining) as usize;
        candidates.swap(slot, pick);
    }
    candidates.truncate(n);
    Ok(candidates)
}

/// `n` headings drawn i.i.d. uniform over the four directions.
pub fn random_directions(seed: Seed, n: usize) -> Vec<Direction> {
    seed.split_n(n)
        .into_iter()
        .map(|draw| Direction::from_index(draw.below(4)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn room_has_border_and_open_interior() {
        let grid = Grid::room(5, 6).unwrap();
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.width(), 6);
        for col in 0..6 {
            assert!(!grid.is_walkable(Position::new(0, col)));
            assert!(!grid.is_walkable(Position::new(4, col)));
        }
        for row in 0..5 {
            assert!(!grid.is_walkable(Position::new(row, 0)));
            assert!(!grid.is_walkable(Position::new(row, 5)));
        }
        assert_eq!(grid.walkable_cells().len(), 3 * 4);
    }

    #[test]
    fn minimum_room_has_single_cell() {
        let grid = Grid::room(3, 3).unwrap();
        assert_eq!(grid.walkable_cells(), vec![Position::new(1, 1)]);
    }

    #[test]
    fn undersized_room_is_rejected() {
        assert_eq!(
            Grid::room(2, 8),
            Err(GridError::InvalidGridDimensions {
                height: 2,
                width: 8,
                minimum: MIN_DIMENSION
            })
        );
        assert!(Grid::room(8, 0).is_err());
    }

    #[test]
    fn validate_rejects_inconsistent_fields() {
        assert_eq!(Grid::room(4, 5).unwrap().validate(), Ok(()));
        let short = Grid {
            height: 4,
            width: 5,
            cells: vec![WALKABLE; 19],
        };
        assert_eq!(
            short.validate(),
            Err(GridError::ShapeMismatch {
                what: "grid cells",
                expected: 20,
                actual: 19
            })
        );
        let flat = Grid {
            height: 1,
            width: 4,
            cells: vec![WALKABLE; 4],
        };
        assert!(matches!(
            flat.validate(),
            Err(GridError::InvalidGridDimensions { .. })
        ));
    }

    #[test]
    fn out_of_field_is_not_walkable() {
        let grid = Grid::room(4, 4).unwrap();
        assert_eq!(grid.get(Position::new(-1, 1)), None);
        assert!(!grid.is_walkable(Position::new(1, 9)));
    }

    #[test]
    fn random_positions_are_distinct_and_walkable() {
        let grid = Grid::room(8, 8).unwrap();
        let positions = random_positions(Seed::new(0), &grid, 36).unwrap();
        let unique: BTreeSet<_> = positions.iter().copied().collect();
        assert_eq!(unique.len(), 36);
        assert!(positions.iter().all(|p| grid.is_walkable(*p)));
    }

    #[test]
    fn random_positions_reproducible() {
        let grid = Grid::room(10, 10).unwrap();
        let a = random_positions(Seed::new(5), &grid, 4).unwrap();
        let b = random_positions(Seed::new(5), &grid, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn too_many_positions_fails_instead_of_looping() {
        let grid = Grid::room(4, 4).unwrap();
        assert_eq!(
            random_positions(Seed::new(1), &grid, 5),
            Err(GridError::InsufficientFreeCells {
                requested: 5,
                available: 4
            })
        );
    }

    #[test]
    fn filtered_sampling_respects_filter() {
        let grid = Grid::room(6, 9).unwrap();
        let left = random_positions_where(Seed::new(2), &grid, 3, |p| p.col < 4).unwrap();
        assert!(left.iter().all(|p| p.col < 4));
    }

    #[test]
    fn random_directions_length_and_reproducibility() {
        let a = random_directions(Seed::new(9), 16);
        assert_eq!(a.len(), 16);
        assert_eq!(a, random_directions(Seed::new(9), 16));
    }
}
