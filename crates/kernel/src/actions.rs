//! Action functions and the published action tables.
//!
//! Every action is a pure `fn(&State) -> State`. Actions drive each player of
//! the batch in index order; layouts place exactly one. Player moves are
//! checked with [`can_occupy`], dropped keys with [`can_spawn`]; an illegal
//! move leaves the state as it was.

use crate::entities::{translate, DoorState, Entity, Pocket};
use crate::occupancy::{can_occupy, can_spawn};
use crate::state::State;
use gridworld_common::{Direction, GridError, Result};

/// A pure state transform.
pub type ActionFn = fn(&State) -> State;

/// An action function with its public name.
#[derive(Debug, Clone, Copy)]
pub struct NamedAction {
    pub name: &'static str,
    pub apply: ActionFn,
}

/// An ordered action space. The index of an entry is its action id.
#[derive(Debug, Clone, Copy)]
pub struct ActionTable {
    name: &'static str,
    actions: &'static [NamedAction],
}

impl ActionTable {
    pub const fn new(name: &'static str, actions: &'static [NamedAction]) -> Self {
        Self { name, actions }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Entry for `index`; out-of-range indices are an error, never clamped.
    pub fn get(&self, index: usize) -> Result<&NamedAction> {
        self.actions.get(index).ok_or(GridError::InvalidAction {
            index,
            len: self.actions.len(),
        })
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|action| action.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedAction> {
        self.actions.iter()
    }
}

/// Indices of [`MINIGRID`].
pub mod minigrid {
    pub const ROTATE_CCW: usize = 0;
    pub const ROTATE_CW: usize = 1;
    pub const FORWARD: usize = 2;
    pub const PICKUP: usize = 3;
    pub const DROP: usize = 4;
    pub const TOGGLE: usize = 5;
    pub const DONE: usize = 6;
}

/// Indices of [`COMPLETE`].
pub mod complete {
    pub const NOOP: usize = 0;
    pub const ROTATE_CW: usize = 1;
    pub const ROTATE_CCW: usize = 2;
    pub const FORWARD: usize = 3;
    pub const STRAFE_RIGHT: usize = 4;
    pub const BACKWARD: usize = 5;
    pub const STRAFE_LEFT: usize = 6;
    pub const PICKUP: usize = 7;
    pub const TOGGLE: usize = 8;
    pub const DONE: usize = 9;
}

/// The seven-action space: rotate, move forward, manipulate objects, declare done.
pub const MINIGRID: ActionTable = ActionTable::new(
    "minigrid",
    &[
        NamedAction { name: "rotate_ccw", apply: rotate_ccw },
        NamedAction { name: "rotate_cw", apply: rotate_cw },
        NamedAction { name: "forward", apply: forward },
        NamedAction { name: "pickup", apply: pickup },
        NamedAction { name: "drop", apply: drop },
        NamedAction { name: "toggle", apply: toggle },
        NamedAction { name: "done", apply: done },
    ],
);

/// The ten-action space with strafing and an explicit no-op.
pub const COMPLETE: ActionTable = ActionTable::new(
    "complete",
    &[
        NamedAction { name: "noop", apply: noop },
        NamedAction { name: "rotate_cw", apply: rotate_cw },
        NamedAction { name: "rotate_ccw", apply: rotate_ccw },
        NamedAction { name: "forward", apply: forward },
        NamedAction { name: "strafe_right", apply: strafe_right },
        NamedAction { name: "backward", apply: backward },
        NamedAction { name: "strafe_left", apply: strafe_left },
        NamedAction { name: "pickup", apply: pickup },
        NamedAction { name: "toggle", apply: toggle },
        NamedAction { name: "done", apply: done },
    ],
);

/// Look up a published table by name.
pub fn table_by_name(name: &str) -> Option<ActionTable> {
    match name {
        "minigrid" => Some(MINIGRID),
        "complete" => Some(COMPLETE),
        _ => None,
    }
}

pub fn noop(state: &State) -> State {
    state.clone()
}

/// Identity on the world; termination strategies may react to it.
pub fn done(state: &State) -> State {
    state.clone()
}

pub fn rotate_cw(state: &State) -> State {
    each_player(state, |s, i| turn(s, i, Direction::rotate_cw))
}

pub fn rotate_ccw(state: &State) -> State {
    each_player(state, |s, i| turn(s, i, Direction::rotate_ccw))
}

pub fn forward(state: &State) -> State {
    each_player(state, |s, i| walk(s, i, |d| d))
}

/// Step away from the heading without turning.
pub fn backward(state: &State) -> State {
    each_player(state, |s, i| walk(s, i, Direction::opposite))
}

pub fn strafe_right(state: &State) -> State {
    each_player(state, |s, i| walk(s, i, Direction::rotate_cw))
}

pub fn strafe_left(state: &State) -> State {
    each_player(state, |s, i| walk(s, i, Direction::rotate_ccw))
}

/// Pick up the key in front of the player if its pocket is empty.
pub fn pickup(state: &State) -> State {
    each_player(state, pick_up_one)
}

/// Put the carried key on the cell in front, if that cell can be occupied.
pub fn drop(state: &State) -> State {
    each_player(state, drop_one)
}

/// Open or close the door in front. Locked doors need the matching key.
pub fn toggle(state: &State) -> State {
    each_player(state, toggle_one)
}

fn each_player<F>(state: &State, act: F) -> State
where
    F: Fn(&State, usize) -> State,
{
    (0..state.entities().players.len()).fold(state.clone(), |current, index| act(&current, index))
}

fn with_player(state: &State, index: usize, player: Entity<Pocket>) -> State {
    let mut entities = state.entities().clone();
    entities.players = entities.players.with_entity(index, player);
    state.with_entities(entities)
}

fn turn(state: &State, index: usize, rotate: fn(Direction) -> Direction) -> State {
    let Some(mut player) = state.entities().players.get(index) else {
        return state.clone();
    };
    player.direction = rotate(player.direction);
    with_player(state, index, player)
}

fn walk(state: &State, index: usize, heading: fn(Direction) -> Direction) -> State {
    let Some(mut player) = state.entities().players.get(index) else {
        return state.clone();
    };
    let target = translate(player.position, heading(player.direction));
    if !can_occupy(state, target) {
        return state.clone();
    }
    player.position = target;
    with_player(state, index, player)
}

fn pick_up_one(state: &State, index: usize) -> State {
    let Some(mut player) = state.entities().players.get(index) else {
        return state.clone();
    };
    if player.tag.held.is_some() {
        return state.clone();
    }
    let front = translate(player.position, player.direction);
    let keys = &state.entities().keys;
    let Some(slot) = keys.find(|key| !key.tag.carried && key.position == front) else {
        return state.clone();
    };
    let Some(mut key) = keys.get(slot) else {
        return state.clone();
    };
    key.tag.carried = true;
    player.tag.held = Some(key.tag.id);

    let mut entities = state.entities().clone();
    entities.keys = keys.with_entity(slot, key);
    entities.players = entities.players.with_entity(index, player);
    state.with_entities(entities)
}

fn drop_one(state: &State, index: usize) -> State {
    let Some(mut player) = state.entities().players.get(index) else {
        return state.clone();
    };
    let Some(held) = player.tag.held else {
        return state.clone();
    };
    let front = translate(player.position, player.direction);
    if !can_spawn(state, front) {
        return state.clone();
    }
    let keys = &state.entities().keys;
    let Some(slot) = keys.find(|key| key.tag.carried && key.tag.id == held) else {
        return state.clone();
    };
    let Some(mut key) = keys.get(slot) else {
        return state.clone();
    };
    key.position = front;
    key.tag.carried = false;
    player.tag.held = None;

    let mut entities = state.entities().clone();
    entities.keys = keys.with_entity(slot, key);
    entities.players = entities.players.with_entity(index, player);
    state.with_entities(entities)
}

fn toggle_one(state: &State, index: usize) -> State {
    let Some(player) = state.entities().players.get(index) else {
        return state.clone();
    };
    let front = translate(player.position, player.direction);
    let doors = &state.entities().doors;
    let Some(slot) = doors.find(|door| door.position == front) else {
        return state.clone();
    };
    let Some(mut door) = doors.get(slot) else {
        return state.clone();
    };
    door.tag.state = match door.tag.state {
        DoorState::Closed => DoorState::Open,
        // A door cannot swing shut on something standing in the doorway.
        DoorState::Open if state.entities().is_blocked(front) => DoorState::Open,
        DoorState::Open => DoorState::Closed,
        DoorState::Locked if player.tag.held == Some(door.tag.requires) => DoorState::Open,
        DoorState::Locked => DoorState::Locked,
    };

    let mut entities = state.entities().clone();
    entities.doors = doors.with_entity(slot, door);
    state.with_entities(entities)
}
