//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so a page can
//! override it through settings without recompiling.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay constants for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub surface_width: f32,
    pub surface_height: f32,

    pub player_x: f32,
    pub player_size: f32,
    pub player_step: f32,

    pub wall_width: f32,
    pub wall_min_height: u32,
    pub wall_max_height: u32,
    pub spawn_spacing: f32,
    pub scroll_speed: f32,

    pub pickup_radius: f32,
    pub pickup_margin: f32,
    pub pickup_floor: f32,
    pub pickup_reach: f32,
    pub pickup_power: u8,
    pub max_pickup_attempts: u32,

    pub start_power: u8,
    pub max_power: u8,

    pub clock_period_ms: u32,
    pub input_period_ms: u32,

    /// Leaving the surface ends the run even with no wall alongside.
    /// Off by default: the loss only triggers while a wall overlaps the
    /// player's column.
    pub out_of_bounds_always_fatal: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            surface_width: SURFACE_WIDTH,
            surface_height: SURFACE_HEIGHT,

            player_x: PLAYER_X,
            player_size: PLAYER_SIZE,
            player_step: PLAYER_STEP,

            wall_width: WALL_WIDTH,
            wall_min_height: WALL_MIN_HEIGHT,
            wall_max_height: WALL_MAX_HEIGHT,
            spawn_spacing: SPAWN_SPACING,
            scroll_speed: SCROLL_SPEED,

            pickup_radius: PICKUP_RADIUS,
            pickup_margin: PICKUP_MARGIN,
            pickup_floor: PICKUP_FLOOR,
            pickup_reach: PICKUP_REACH,
            pickup_power: PICKUP_POWER,
            max_pickup_attempts: MAX_PICKUP_ATTEMPTS,

            start_power: START_POWER,
            max_power: MAX_POWER,

            clock_period_ms: CLOCK_PERIOD_MS,
            input_period_ms: INPUT_PERIOD_MS,

            out_of_bounds_always_fatal: false,
        }
    }
}

impl Tuning {
    /// Vertical centre of the surface (player start position)
    pub fn surface_center_y(&self) -> f32 {
        self.surface_height / 2.0
    }

    /// Half the player sprite's edge length
    pub fn player_half(&self) -> f32 {
        self.player_size / 2.0
    }

    /// Right edge of the player's fixed column
    pub fn player_right(&self) -> f32 {
        self.player_x + self.player_size
    }

    /// Batteries are tracked by their bounding box
    pub fn pickup_diameter(&self) -> f32 {
        self.pickup_radius * 2.0
    }

    /// Spawned entities start here and scroll left
    pub fn spawn_x(&self) -> f32 {
        self.surface_width
    }

    /// A new entity is due once the previous one is left of this line
    pub fn spawn_line(&self) -> f32 {
        self.surface_width - self.spawn_spacing
    }
}
