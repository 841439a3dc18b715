//! Stock termination strategies.

use crate::rewards::{bumped_into_ball, player_on_goal};
use crate::strategy::TerminationFn;
use gridworld_kernel::{DoorState, State};

/// The player ends the step on a goal.
pub fn on_goal_reached(_prev: &State, _action: usize, next: &State) -> bool {
    player_on_goal(next)
}

/// Some door was not open before the step and is open after it.
pub fn on_door_opened(prev: &State, _action: usize, next: &State) -> bool {
    let was_open = |state: &State, index: usize| {
        state
            .entities()
            .doors
            .tags()
            .get(index)
            .is_some_and(|tag| tag.state == DoorState::Open)
    };
    (0..next.entities().doors.len()).any(|index| !was_open(prev, index) && was_open(next, index))
}

/// The player walked into a ball with the `forward` action.
pub fn on_ball_hit(forward: usize) -> impl TerminationFn {
    move |prev: &State, action: usize, _: &State| bumped_into_ball(prev, action, forward)
}

/// Either condition ends the episode.
pub fn any<A, B>(a: A, b: B) -> impl TerminationFn
where
    A: TerminationFn,
    B: TerminationFn,
{
    move |prev: &State, action: usize, next: &State| {
        a.is_terminal(prev, action, next) || b.is_terminal(prev, action, next)
    }
}

/// Episodes only end by truncation.
pub fn never(_prev: &State, _action: usize, _next: &State) -> bool {
    false
}
