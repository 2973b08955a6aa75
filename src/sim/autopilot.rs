//! Idle/demo mode steering
//!
//! Picks a target height from the nearest wall still ahead of the player and
//! holds Up or Down until the player is close enough to it.

use super::input::{Action, InputTracker};
use super::state::{Anchor, GameState};

/// Don't chase targets closer than this
const DEAD_ZONE: f32 = 6.0;

/// Vertical target for the player, if anything is ahead
pub fn target_y(state: &GameState) -> Option<f32> {
    let t = &state.tuning;
    let wall = state
        .obstacles
        .iter()
        .filter(|w| w.x + t.wall_width > t.player_x)
        .min_by(|a, b| a.x.total_cmp(&b.x))?;

    // Free gap beside the wall, shrunk so the sprite fits
    let (gap_top, gap_bottom) = match wall.anchor {
        Anchor::Top => (wall.bottom(), t.surface_height),
        Anchor::Bottom => (0.0, wall.y),
    };
    let lo = gap_top + t.player_half() + DEAD_ZONE;
    let hi = gap_bottom - t.player_half() - DEAD_ZONE;
    if lo > hi {
        return Some((gap_top + gap_bottom) / 2.0);
    }

    // Detour for a battery before the wall if it sits inside the gap
    let battery = state
        .pickups
        .iter()
        .filter(|p| p.x + t.pickup_diameter() > t.player_x && p.x < wall.x)
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .map(|p| p.y)
        .filter(|y| (lo..=hi).contains(y));

    Some(battery.unwrap_or((lo + hi) / 2.0))
}

/// Update forced actions on `input` to steer toward [`target_y`]
pub fn steer(state: &GameState, input: &mut InputTracker) {
    let target = target_y(state);
    let delta = target.map(|y| y - state.player_y).unwrap_or(0.0);
    input.set_forced(Action::Up, delta < -DEAD_ZONE);
    input.set_forced(Action::Down, delta > DEAD_ZONE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::KeyBindings;
    use crate::sim::state::{Obstacle, Pickup};
    use crate::tuning::Tuning;

    fn running_state() -> GameState {
        let mut state = GameState::new(Tuning::default());
        state.begin_run("bot");
        state
    }

    #[test]
    fn test_no_target_without_walls() {
        let state = running_state();
        assert_eq!(target_y(&state), None);
        let mut input = InputTracker::new(KeyBindings::default());
        steer(&state, &mut input);
        assert!(!input.is_held(Action::Up) && !input.is_held(Action::Down));
    }

    #[test]
    fn test_steers_below_top_wall() {
        let mut state = running_state();
        state.obstacles.push(Obstacle::anchored(300.0, 400.0, Anchor::Top, 600.0));
        let target = target_y(&state).unwrap();
        assert!(target > 400.0 + 25.0 && target < 600.0 - 25.0);

        let mut input = InputTracker::new(KeyBindings::default());
        steer(&state, &mut input);
        assert!(input.is_held(Action::Down));
        assert!(!input.is_held(Action::Up));
    }

    #[test]
    fn test_ignores_walls_already_passed() {
        let mut state = running_state();
        state.obstacles.push(Obstacle::anchored(-10.0, 400.0, Anchor::Top, 600.0));
        state.obstacles.push(Obstacle::anchored(500.0, 400.0, Anchor::Bottom, 600.0));
        let target = target_y(&state).unwrap();
        assert!(target < 200.0);
    }

    #[test]
    fn test_detours_for_battery_in_gap() {
        let mut state = running_state();
        state.obstacles.push(Obstacle::anchored(600.0, 200.0, Anchor::Top, 600.0));
        state.pickups.push(Pickup { x: 300.0, y: 500.0 });
        assert_eq!(target_y(&state), Some(500.0));
    }
}
