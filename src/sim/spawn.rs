//! Wall and battery generation
//!
//! Spawning is gated by distance travelled rather than elapsed time, so
//! spacing stays even regardless of frame rate.

use rand::Rng;

use super::state::{Anchor, GameState, Obstacle, Pickup};
use crate::tuning::Tuning;

/// Tracks where the most recent spawn of one entity kind has scrolled to.
///
/// Kept apart from the entity list so that collecting or pruning entities
/// never makes the next spawn come early.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnCursor {
    last_x: Option<f32>,
}

impl SpawnCursor {
    /// Nothing spawned yet, or the last spawn has travelled far enough
    pub fn is_due(&self, tuning: &Tuning) -> bool {
        self.last_x.is_none_or(|x| x < tuning.spawn_line())
    }

    pub fn mark(&mut self, x: f32) {
        self.last_x = Some(x);
    }

    pub fn scroll(&mut self, dx: f32) {
        if let Some(x) = self.last_x.as_mut() {
            *x -= dx;
        }
    }

    pub fn last_x(&self) -> Option<f32> {
        self.last_x
    }
}

/// A wall at the right edge with random height and anchoring
pub fn random_obstacle<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> Obstacle {
    let height = rng.random_range(tuning.wall_min_height..tuning.wall_max_height) as f32;
    let anchor = if rng.random_bool(0.5) {
        Anchor::Top
    } else {
        Anchor::Bottom
    };
    Obstacle::anchored(tuning.spawn_x(), height, anchor, tuning.surface_height)
}

/// A battery at `y` keeps the required margin from `wall`
pub fn clears_wall(tuning: &Tuning, y: f32, wall: &Obstacle) -> bool {
    y + tuning.pickup_margin <= wall.y || y - tuning.pickup_margin >= wall.bottom()
}

/// Pick a battery height that is reachable next to `wall`.
///
/// Rejection sampling, bounded by `max_pickup_attempts`; falls back to
/// [`fallback_pickup_y`] when every attempt lands inside the wall.
pub fn sample_pickup_y<R: Rng + ?Sized>(
    tuning: &Tuning,
    wall: &Obstacle,
    rng: &mut R,
) -> Option<f32> {
    let ceiling = tuning.surface_height - tuning.pickup_floor;
    if ceiling <= 0.0 {
        return None;
    }

    for _ in 0..tuning.max_pickup_attempts {
        let y = rng.random_range(0.0..ceiling);
        if clears_wall(tuning, y, wall) {
            return Some(y);
        }
    }

    let fallback = fallback_pickup_y(tuning, wall);
    log::warn!(
        "Battery sampling exhausted {} attempts, falling back to {:?}",
        tuning.max_pickup_attempts,
        fallback
    );
    fallback
}

/// Deterministic battery height: just below the wall, else just above it
pub fn fallback_pickup_y(tuning: &Tuning, wall: &Obstacle) -> Option<f32> {
    let ceiling = tuning.surface_height - tuning.pickup_floor;
    let below = wall.bottom() + tuning.pickup_margin;
    let above = wall.y - tuning.pickup_margin;
    [below, above]
        .into_iter()
        .find(|&y| (0.0..ceiling).contains(&y) && clears_wall(tuning, y, wall))
}

/// Spawn a wall if the spacing rule allows. Returns true if one was added.
pub fn spawn_obstacle<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> bool {
    if !state.wall_cursor.is_due(&state.tuning) {
        return false;
    }
    let wall = random_obstacle(&state.tuning, rng);
    log::trace!(
        "Wall spawned: height {} from {:?} (frame {})",
        wall.height,
        wall.anchor,
        state.frame
    );
    state.wall_cursor.mark(wall.x);
    state.obstacles.push(wall);
    true
}

/// Spawn a battery if the spacing rule allows and a wall exists to place
/// it against. Returns true if one was added.
pub fn spawn_pickup<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> bool {
    if !state.pickup_cursor.is_due(&state.tuning) {
        return false;
    }
    let Some(wall) = state.obstacles.last().copied() else {
        return false;
    };
    let Some(y) = sample_pickup_y(&state.tuning, &wall, rng) else {
        return false;
    };
    let x = state.tuning.spawn_x();
    state.pickup_cursor.mark(x);
    state.pickups.push(Pickup { x, y });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn running_state() -> GameState {
        let mut state = GameState::new(Tuning::default());
        state.begin_run("A");
        state
    }

    #[test]
    fn test_obstacle_height_and_anchor() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let wall = random_obstacle(&tuning, &mut rng);
            assert!(wall.height >= 100.0 && wall.height < 500.0);
            assert_eq!(wall.height, wall.height.floor());
            assert_eq!(wall.x, tuning.surface_width);
            match wall.anchor {
                Anchor::Top => assert_eq!(wall.y, 0.0),
                Anchor::Bottom => assert_eq!(wall.bottom(), tuning.surface_height),
            }
        }
    }

    #[test]
    fn test_both_anchors_occur() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let walls: Vec<_> = (0..100).map(|_| random_obstacle(&tuning, &mut rng)).collect();
        assert!(walls.iter().any(|w| w.anchor == Anchor::Top));
        assert!(walls.iter().any(|w| w.anchor == Anchor::Bottom));
    }

    #[test]
    fn test_no_pickup_without_wall() {
        let mut state = running_state();
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(!spawn_pickup(&mut state, &mut rng));
        assert!(state.pickups.is_empty());
        assert_eq!(state.pickup_cursor.last_x(), None);
    }

    #[test]
    fn test_spawns_respect_spacing() {
        let mut state = running_state();
        let mut rng = Pcg32::seed_from_u64(3);
        let speed = state.tuning.scroll_speed;
        let mut travelled_since_wall: Option<f32> = None;
        let mut travelled_since_pickup: Option<f32> = None;

        for _ in 0..5000 {
            if spawn_obstacle(&mut state, &mut rng) {
                if let Some(d) = travelled_since_wall {
                    assert!(d >= state.tuning.spawn_spacing, "walls {d}px apart");
                }
                travelled_since_wall = Some(0.0);
            }
            if spawn_pickup(&mut state, &mut rng) {
                if let Some(d) = travelled_since_pickup {
                    assert!(d >= state.tuning.spawn_spacing, "batteries {d}px apart");
                }
                travelled_since_pickup = Some(0.0);
            }
            state.wall_cursor.scroll(speed);
            state.pickup_cursor.scroll(speed);
            travelled_since_wall = travelled_since_wall.map(|d| d + speed);
            travelled_since_pickup = travelled_since_pickup.map(|d| d + speed);
        }
    }

    #[test]
    fn test_collecting_last_pickup_does_not_respawn_early() {
        let mut state = running_state();
        let mut rng = Pcg32::seed_from_u64(5);
        assert!(spawn_obstacle(&mut state, &mut rng));
        assert!(spawn_pickup(&mut state, &mut rng));
        state.pickups.clear();
        assert!(!spawn_pickup(&mut state, &mut rng));
    }

    #[test]
    fn test_fallback_below_top_wall() {
        let tuning = Tuning::default();
        let wall = Obstacle::anchored(0.0, 400.0, Anchor::Top, tuning.surface_height);
        assert_eq!(fallback_pickup_y(&tuning, &wall), Some(425.0));
    }

    #[test]
    fn test_fallback_above_bottom_wall() {
        let tuning = Tuning::default();
        let wall = Obstacle::anchored(0.0, 400.0, Anchor::Bottom, tuning.surface_height);
        // Below would be 625, past the floor line
        assert_eq!(fallback_pickup_y(&tuning, &wall), Some(175.0));
    }

    #[test]
    fn test_fallback_none_when_wall_fills_surface() {
        let tuning = Tuning::default();
        let wall = Obstacle::anchored(0.0, 600.0, Anchor::Top, tuning.surface_height);
        assert_eq!(fallback_pickup_y(&tuning, &wall), None);
        let mut rng = Pcg32::seed_from_u64(9);
        assert_eq!(sample_pickup_y(&tuning, &wall, &mut rng), None);
    }

    proptest! {
        #[test]
        fn prop_pickup_clears_latest_wall(
            seed in any::<u64>(),
            height in 100u32..500,
            top in any::<bool>(),
            attempts in 0u32..4,
        ) {
            let tuning = Tuning { max_pickup_attempts: attempts, ..Tuning::default() };
            let anchor = if top { Anchor::Top } else { Anchor::Bottom };
            let wall = Obstacle::anchored(0.0, height as f32, anchor, tuning.surface_height);
            let mut rng = Pcg32::seed_from_u64(seed);

            let y = sample_pickup_y(&tuning, &wall, &mut rng);
            prop_assert!(y.is_some());
            let y = y.unwrap();
            prop_assert!(y + 25.0 <= wall.y || y - 25.0 >= wall.bottom());
            prop_assert!((0.0..550.0).contains(&y));
        }
    }
}
