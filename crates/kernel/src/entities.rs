//! Typed entity batches.
//!
//! Each kind is stored as a struct-of-arrays [`Batch`]: equal-length parallel
//! sequences of positions, headings and per-kind tags. The set of kinds is
//! closed and fixed by [`EntityTable`]; there is no runtime type inspection.
//!
//! # Invariants
//! - `positions`, `directions` and `tags` of a batch always have equal length.
//! - Batches are values: every update returns a new batch.

use gridworld_common::{Direction, GridError, Position, Result};
use serde::{Deserialize, Serialize};

/// Identifier pairing a key with the door it unlocks.
pub type KeyId = u32;

/// The closed set of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Player,
    Goal,
    Key,
    Door,
    Ball,
    Wall,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Player,
        Kind::Goal,
        Kind::Key,
        Kind::Door,
        Kind::Ball,
        Kind::Wall,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Kind::Player => "player",
            Kind::Goal => "goal",
            Kind::Key => "key",
            Kind::Door => "door",
            Kind::Ball => "ball",
            Kind::Wall => "wall",
        }
    }
}

/// Player tag: the key currently carried, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pocket {
    pub held: Option<KeyId>,
}

/// Key tag. A carried key leaves the map: it neither blocks nor renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyTag {
    pub id: KeyId,
    pub carried: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Open,
    Closed,
    Locked,
}

/// Door tag: current state and the key that unlocks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorTag {
    pub state: DoorState,
    pub requires: KeyId,
}

/// One entity lifted out of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity<T> {
    pub position: Position,
    pub direction: Direction,
    pub tag: T,
}

/// Moves one cell in `direction`. Callers must check bounds and obstacles.
pub fn translate(position: Position, direction: Direction) -> Position {
    position.step(direction)
}

/// Struct-of-arrays storage for all entities of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Batch<T> {
    positions: Vec<Position>,
    directions: Vec<Direction>,
    tags: Vec<T>,
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            directions: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl<T: Clone> Batch<T> {
    /// Build a batch from parallel sequences of equal length.
    pub fn new(positions: Vec<Position>, directions: Vec<Direction>, tags: Vec<T>) -> Self {
        assert_eq!(positions.len(), directions.len(), "batch arrays must match");
        assert_eq!(positions.len(), tags.len(), "batch arrays must match");
        Self {
            positions,
            directions,
            tags,
        }
    }

    /// Unoriented entities with default tags at the given cells.
    pub fn at(positions: Vec<Position>) -> Self
    where
        T: Default,
    {
        let n = positions.len();
        Self::new(positions, vec![Direction::default(); n], vec![T::default(); n])
    }

    pub fn single(entity: Entity<T>) -> Self {
        Self::new(vec![entity.position], vec![entity.direction], vec![entity.tag])
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn tags(&self) -> &[T] {
        &self.tags
    }

    pub fn get(&self, index: usize) -> Option<Entity<T>> {
        Some(Entity {
            position: *self.positions.get(index)?,
            direction: *self.directions.get(index)?,
            tag: self.tags.get(index)?.clone(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity<T>> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }

    /// Index of the first entity matching `predicate`.
    pub fn find<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(&Entity<T>) -> bool,
    {
        self.iter().position(|entity| predicate(&entity))
    }

    /// Parallel arrays must agree in length. Only decoded batches can
    /// violate this; [`Batch::new`] enforces it on construction.
    pub fn validate(&self, what: &'static str) -> Result<()> {
        for actual in [self.directions.len(), self.tags.len()] {
            if actual != self.positions.len() {
                return Err(GridError::ShapeMismatch {
                    what,
                    expected: self.positions.len(),
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Per-entity equality against a single cell.
    pub fn positions_equal(&self, position: Position) -> Vec<bool> {
        self.positions.iter().map(|p| *p == position).collect()
    }

    /// Replace every position at once.
    pub fn with_positions(&self, positions: Vec<Position>) -> Self {
        Self::new(positions, self.directions.clone(), self.tags.clone())
    }

    /// Replace every heading at once.
    pub fn with_directions(&self, directions: Vec<Direction>) -> Self {
        Self::new(self.positions.clone(), directions, self.tags.clone())
    }

    /// Replace the entity at `index`. Out-of-range indices return an unchanged copy.
    pub fn with_entity(&self, index: usize, entity: Entity<T>) -> Self {
        let mut next = self.clone();
        if index < next.len() {
            next.positions[index] = entity.position;
            next.directions[index] = entity.direction;
            next.tags[index] = entity.tag;
        }
        next
    }
}

/// All entities of a state, one batch per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTable {
    pub players: Batch<Pocket>,
    pub goals: Batch<()>,
    pub keys: Batch<KeyTag>,
    pub doors: Batch<DoorTag>,
    pub balls: Batch<()>,
    pub walls: Batch<()>,
}

impl EntityTable {
    pub fn validate(&self) -> Result<()> {
        self.players.validate("player batch")?;
        self.goals.validate("goal batch")?;
        self.keys.validate("key batch")?;
        self.doors.validate("door batch")?;
        self.balls.validate("ball batch")?;
        self.walls.validate("wall batch")
    }

    /// Number of entities of `kind`.
    pub fn count(&self, kind: Kind) -> usize {
        match kind {
            Kind::Player => self.players.len(),
            Kind::Goal => self.goals.len(),
            Kind::Key => self.keys.len(),
            Kind::Door => self.doors.len(),
            Kind::Ball => self.balls.len(),
            Kind::Wall => self.walls.len(),
        }
    }

    /// Every on-map entity as `(kind, position)`, kinds in [`Kind::ALL`] order.
    /// Carried keys are off the map and skipped.
    pub fn placed(&self) -> Vec<(Kind, Position)> {
        let mut placed = Vec::new();
        placed.extend(self.players.positions().iter().map(|p| (Kind::Player, *p)));
        placed.extend(self.goals.positions().iter().map(|p| (Kind::Goal, *p)));
        placed.extend(
            self.keys
                .iter()
                .filter(|key| !key.tag.carried)
                .map(|key| (Kind::Key, key.position)),
        );
        placed.extend(self.doors.positions().iter().map(|p| (Kind::Door, *p)));
        placed.extend(self.balls.positions().iter().map(|p| (Kind::Ball, *p)));
        placed.extend(self.walls.positions().iter().map(|p| (Kind::Wall, *p)));
        placed
    }

    /// Positions of every blocking entity, duplicates included.
    ///
    /// Players, balls, walls, keys on the ground and doors that are not open
    /// block. Goals, carried keys and open doors do not.
    pub fn blocking_positions(&self) -> Vec<Position> {
        let mut blocking = Vec::new();
        blocking.extend_from_slice(self.players.positions());
        blocking.extend(
            self.keys
                .iter()
                .filter(|key| !key.tag.carried)
                .map(|key| key.position),
        );
        blocking.extend(
            self.doors
                .iter()
                .filter(|door| door.tag.state != DoorState::Open)
                .map(|door| door.position),
        );
        blocking.extend_from_slice(self.balls.positions());
        blocking.extend_from_slice(self.walls.positions());
        blocking
    }

    /// Whether any blocking entity sits on `position`.
    pub fn is_blocked(&self, position: Position) -> bool {
        let any = |mask: Vec<bool>| mask.into_iter().any(|hit| hit);
        any(self.players.positions_equal(position))
            || self
                .keys
                .iter()
                .any(|key| !key.tag.carried && key.position == position)
            || self
                .doors
                .iter()
                .any(|door| door.tag.state != DoorState::Open && door.position == position)
            || any(self.balls.positions_equal(position))
            || any(self.walls.positions_equal(position))
    }

    /// The most salient on-map kind at `position`, for observations.
    ///
    /// Priority: player, ball, key, door, wall, goal.
    pub fn kind_at(&self, position: Position) -> Option<Kind> {
        const PRIORITY: [Kind; 6] = [
            Kind::Player,
            Kind::Ball,
            Kind::Key,
            Kind::Door,
            Kind::Wall,
            Kind::Goal,
        ];
        let placed = self.placed();
        PRIORITY
            .into_iter()
            .find(|kind| placed.iter().any(|(k, p)| k == kind && *p == position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn translate_ignores_bounds() {
        assert_eq!(translate(p(1, 1), Direction::North), p(0, 1));
        assert_eq!(translate(p(0, 0), Direction::West), p(0, -1));
    }

    #[test]
    fn positions_equal_is_per_entity() {
        let balls: Batch<()> = Batch::at(vec![p(1, 1), p(2, 2), p(1, 1)]);
        assert_eq!(balls.positions_equal(p(1, 1)), vec![true, false, true]);
        assert_eq!(balls.positions_equal(p(5, 5)), vec![false, false, false]);
    }

    #[test]
    fn replace_updates_return_new_batches() {
        let balls: Batch<()> = Batch::at(vec![p(1, 1), p(2, 2)]);
        let moved = balls.with_positions(vec![p(3, 3), p(4, 4)]);
        assert_eq!(balls.positions(), &[p(1, 1), p(2, 2)]);
        assert_eq!(moved.positions(), &[p(3, 3), p(4, 4)]);

        let turned = moved.with_directions(vec![Direction::North, Direction::West]);
        assert_eq!(turned.directions()[1], Direction::West);
    }

    #[test]
    #[should_panic(expected = "batch arrays must match")]
    fn mismatched_replace_panics() {
        let balls: Batch<()> = Batch::at(vec![p(1, 1), p(2, 2)]);
        let _ = balls.with_positions(vec![p(1, 1)]);
    }

    #[test]
    fn validate_catches_ragged_batches() {
        let ragged = Batch {
            positions: vec![p(1, 1), p(2, 2)],
            directions: vec![Direction::East],
            tags: vec![(), ()],
        };
        assert_eq!(
            ragged.validate("ball batch"),
            Err(GridError::ShapeMismatch {
                what: "ball batch",
                expected: 2,
                actual: 1
            })
        );
        let table = EntityTable {
            balls: ragged,
            ..EntityTable::default()
        };
        assert!(table.validate().is_err());
        assert_eq!(EntityTable::default().validate(), Ok(()));
    }

    #[test]
    fn with_entity_replaces_one_slot() {
        let keys = Batch::new(
            vec![p(1, 1), p(2, 2)],
            vec![Direction::East; 2],
            vec![
                KeyTag { id: 0, carried: false },
                KeyTag { id: 1, carried: false },
            ],
        );
        let mut second = keys.get(1).unwrap();
        second.tag.carried = true;
        let updated = keys.with_entity(1, second);
        assert!(updated.tags()[1].carried);
        assert!(!keys.tags()[1].carried);
        assert_eq!(keys.with_entity(7, second), keys);
    }

    #[test]
    fn blocking_rules_follow_tags() {
        let table = EntityTable {
            goals: Batch::at(vec![p(1, 1)]),
            keys: Batch::new(
                vec![p(1, 2), p(1, 3)],
                vec![Direction::East; 2],
                vec![
                    KeyTag { id: 0, carried: false },
                    KeyTag { id: 1, carried: true },
                ],
            ),
            doors: Batch::new(
                vec![p(2, 1), p(2, 2)],
                vec![Direction::East; 2],
                vec![
                    DoorTag { state: DoorState::Open, requires: 0 },
                    DoorTag { state: DoorState::Locked, requires: 0 },
                ],
            ),
            ..EntityTable::default()
        };
        assert!(!table.is_blocked(p(1, 1)));
        assert!(table.is_blocked(p(1, 2)));
        assert!(!table.is_blocked(p(1, 3)));
        assert!(!table.is_blocked(p(2, 1)));
        assert!(table.is_blocked(p(2, 2)));
        assert_eq!(table.blocking_positions(), vec![p(1, 2), p(2, 2)]);
    }

    #[test]
    fn kind_at_prefers_player_over_goal() {
        let table = EntityTable {
            players: Batch::single(Entity {
                position: p(1, 1),
                direction: Direction::South,
                tag: Pocket::default(),
            }),
            goals: Batch::at(vec![p(1, 1), p(2, 2)]),
            ..EntityTable::default()
        };
        assert_eq!(table.kind_at(p(1, 1)), Some(Kind::Player));
        assert_eq!(table.kind_at(p(2, 2)), Some(Kind::Goal));
        assert_eq!(table.kind_at(p(3, 3)), None);
        assert_eq!(table.count(Kind::Goal), 2);
    }
}
