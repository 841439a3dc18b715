//! Plain-text rendering of a state, one character per cell.

use gridworld_common::{Direction, Position};
use gridworld_kernel::{DoorState, Kind, State};

fn heading_glyph(direction: Direction) -> char {
    match direction {
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
        Direction::North => '^',
    }
}

fn door_glyph(state: &State, position: Position) -> char {
    let door = state
        .entities()
        .doors
        .iter()
        .find(|door| door.position == position);
    match door.map(|door| door.tag.state) {
        Some(DoorState::Open) => '/',
        Some(DoorState::Closed) => 'd',
        _ => 'D',
    }
}

fn cell_glyph(state: &State, position: Position) -> char {
    match state.entities().kind_at(position) {
        Some(Kind::Player) => state
            .entities()
            .players
            .iter()
            .find(|player| player.position == position)
            .map_or('@', |player| heading_glyph(player.direction)),
        Some(Kind::Goal) => 'G',
        Some(Kind::Key) => 'K',
        Some(Kind::Door) => door_glyph(state, position),
        Some(Kind::Ball) => 'o',
        Some(Kind::Wall) => 'W',
        None if state.grid().is_walkable(position) => '.',
        None => '#',
    }
}

/// Render `state` as newline-separated rows.
pub fn render(state: &State) -> String {
    let grid = state.grid();
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            out.push(cell_glyph(state, Position::new(row as i32, col as i32)));
        }
        out.push('\n');
    }
    out
}

/// Entity counts of `state`, e.g. `player=1 goal=1 ball=4`. Absent kinds are
/// left out.
pub fn census(state: &State) -> String {
    Kind::ALL
        .into_iter()
        .map(|kind| (kind, state.entities().count(kind)))
        .filter(|(_, count)| *count > 0)
        .map(|(kind, count)| format!("{}={count}", kind.name()))
        .collect::<Vec<_>>()
        .join(" ")
}
