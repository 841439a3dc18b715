//! Stock reward strategies.
//!
//! Plain functions implement [`RewardFn`] through the blanket impl; the
//! parameterised ones return closures.

use crate::strategy::RewardFn;
use gridworld_kernel::State;

/// True iff a player stands on a goal cell.
pub(crate) fn player_on_goal(state: &State) -> bool {
    let goals = state.entities().goals.positions();
    state
        .entities()
        .players
        .positions()
        .iter()
        .any(|player| goals.contains(player))
}

/// True iff `action` was `forward` and a ball stood in front of the player.
pub(crate) fn bumped_into_ball(prev: &State, action: usize, forward: usize) -> bool {
    if action != forward {
        return false;
    }
    prev.player().is_some_and(|player| {
        let ahead = player.position.step(player.direction);
        prev.entities().balls.positions().contains(&ahead)
    })
}

/// `1.0` when the player ends the step on a goal, `0.0` otherwise.
pub fn navigation(_prev: &State, _action: usize, next: &State) -> f32 {
    if player_on_goal(next) { 1.0 } else { 0.0 }
}

/// Always `0.0`.
pub fn free(_prev: &State, _action: usize, _next: &State) -> f32 {
    0.0
}

/// `-cost` for every action except `exempt` (usually the no-op).
pub fn action_cost(cost: f32, exempt: usize) -> impl RewardFn {
    move |_: &State, action: usize, _: &State| if action == exempt { 0.0 } else { -cost }
}

/// `-cost` on every step.
pub fn time_cost(cost: f32) -> impl RewardFn {
    move |_: &State, _: usize, _: &State| -cost
}

/// `-1.0` when the player walks into a ball with the `forward` action.
pub fn ball_hit_penalty(forward: usize) -> impl RewardFn {
    move |prev: &State, action: usize, _: &State| {
        if bumped_into_ball(prev, action, forward) { -1.0 } else { 0.0 }
    }
}

/// Sum of two rewards.
pub fn sum<A, B>(a: A, b: B) -> impl RewardFn
where
    A: RewardFn,
    B: RewardFn,
{
    move |prev: &State, action: usize, next: &State| {
        a.reward(prev, action, next) + b.reward(prev, action, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridworld_common::{Direction, Position, Seed};
    use gridworld_kernel::actions::minigrid;
    use gridworld_kernel::{Batch, Entity, EntityTable, Grid, Pocket};
    use std::sync::Arc;

    fn state(player: Position, goal: Position, balls: Vec<Position>) -> State {
        let entities = EntityTable {
            players: Batch::single(Entity {
                position: player,
                direction: Direction::East,
                tag: Pocket::default(),
            }),
            goals: Batch::at(vec![goal]),
            balls: Batch::at(balls),
            ..EntityTable::default()
        };
        State::new(Arc::new(Grid::room(6, 6).unwrap()), entities, Seed::new(0))
    }

    #[test]
    fn navigation_pays_on_goal_only() {
        let off = state(Position::new(1, 1), Position::new(2, 2), vec![]);
        let on = state(Position::new(2, 2), Position::new(2, 2), vec![]);
        assert_eq!(navigation(&off, 0, &off), 0.0);
        assert_eq!(navigation(&off, 0, &on), 1.0);
        assert_eq!(free(&off, 0, &on), 0.0);
    }

    #[test]
    fn costs_and_sums() {
        let s = state(Position::new(1, 1), Position::new(2, 2), vec![]);
        let cost = action_cost(0.1, minigrid::DONE);
        assert_eq!(cost.reward(&s, minigrid::FORWARD, &s), -0.1);
        assert_eq!(cost.reward(&s, minigrid::DONE, &s), 0.0);
        assert_eq!(time_cost(0.5).reward(&s, minigrid::DONE, &s), -0.5);
        let total = sum(navigation, time_cost(0.25));
        let on = state(Position::new(2, 2), Position::new(2, 2), vec![]);
        assert_eq!(total.reward(&s, 0, &on), 0.75);
    }

    #[test]
    fn ball_hit_needs_forward_into_a_ball() {
        let s = state(Position::new(1, 1), Position::new(4, 4), vec![Position::new(1, 2)]);
        let penalty = ball_hit_penalty(minigrid::FORWARD);
        assert_eq!(penalty.reward(&s, minigrid::FORWARD, &s), -1.0);
        assert_eq!(penalty.reward(&s, minigrid::ROTATE_CW, &s), 0.0);
    }
}
