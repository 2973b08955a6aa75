//! Overlap tests between the player and walls/batteries
//!
//! Everything is axis-aligned: a wall is a rectangle, a battery is tested by
//! its bounding box, and the player occupies a fixed column.

use super::state::{GameState, Obstacle, Pickup};
use crate::tuning::Tuning;

/// An interval on one axis. Overlap is strict, so touching edges do not count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// The player's collision box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBand {
    pub horizontal: Span,
    pub vertical: Span,
}

impl PlayerBand {
    pub fn new(tuning: &Tuning, player_y: f32) -> Self {
        let half = tuning.player_half();
        Self {
            horizontal: Span::new(tuning.player_x, tuning.player_right()),
            vertical: Span::new(player_y - half, player_y + half),
        }
    }

    /// The sprite has left the drawing surface vertically
    pub fn out_of_bounds(&self, surface_height: f32) -> bool {
        self.vertical.start < 0.0 || self.vertical.end > surface_height
    }
}

/// Does `wall` end the run for a player at `player_y`?
pub fn obstacle_hits_player(tuning: &Tuning, wall: &Obstacle, player_y: f32) -> bool {
    let band = PlayerBand::new(tuning, player_y);
    let wall_h = Span::new(wall.x, wall.x + tuning.wall_width);
    if !wall_h.overlaps(&band.horizontal) {
        return false;
    }
    let wall_v = Span::new(wall.y, wall.bottom());
    wall_v.overlaps(&band.vertical) || band.out_of_bounds(tuning.surface_height)
}

/// Is `pickup` close enough to be collected?
///
/// The vertical reach is wider than the sprite, and is measured against
/// the battery's top edge.
pub fn pickup_touches_player(tuning: &Tuning, pickup: &Pickup, player_y: f32) -> bool {
    let band = PlayerBand::new(tuning, player_y);
    let pickup_h = Span::new(pickup.x, pickup.x + tuning.pickup_diameter());
    pickup_h.overlaps(&band.horizontal)
        && pickup.y > player_y - tuning.pickup_reach
        && pickup.y < player_y + tuning.pickup_reach
}

/// Index (spawn order) of the first wall hitting the player
pub fn first_obstacle_hit(state: &GameState) -> Option<usize> {
    state
        .obstacles
        .iter()
        .position(|wall| obstacle_hits_player(&state.tuning, wall, state.player_y))
}

/// Leaving the surface with no wall alongside, when tuning makes that fatal
pub fn fatal_out_of_bounds(state: &GameState) -> bool {
    state.tuning.out_of_bounds_always_fatal
        && PlayerBand::new(&state.tuning, state.player_y).out_of_bounds(state.tuning.surface_height)
}
