//! Game state and core simulation types

use serde::{Deserialize, Serialize};

use super::spawn::SpawnCursor;
use crate::tuning::Tuning;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Power meter drained to zero
    Depleted,
    /// Hit a wall (or left the surface beside one)
    Collided,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for a player name
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Run finished; terminal until restart
    Ended(EndReason),
}

/// Which surface edge a wall grows from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Top,
    Bottom,
}

/// A wall segment. Width is fixed by tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub height: f32,
    pub anchor: Anchor,
}

impl Obstacle {
    /// Build a wall of `height` grown from `anchor` at horizontal position `x`
    pub fn anchored(x: f32, height: f32, anchor: Anchor, surface_height: f32) -> Self {
        let y = match anchor {
            Anchor::Top => 0.0,
            Anchor::Bottom => surface_height - height,
        };
        Self { x, y, height, anchor }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A battery. `(x, y)` is the top-left of its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub x: f32,
    pub y: f32,
}

/// Terminal result handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub player_name: String,
    pub elapsed_seconds: u32,
    pub reason: EndReason,
    pub final_power: u8,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub phase: RunPhase,
    pub player_name: String,
    /// Power meter (0..=max_power)
    pub power: u8,
    pub elapsed_seconds: u32,
    /// Vertical centre of the player sprite
    pub player_y: f32,
    /// Walls in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Batteries in spawn order
    pub pickups: Vec<Pickup>,
    pub wall_cursor: SpawnCursor,
    pub pickup_cursor: SpawnCursor,
    /// Frames simulated this run
    pub frame: u64,
}

impl GameState {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            phase: RunPhase::Idle,
            player_name: String::new(),
            power: tuning.start_power,
            elapsed_seconds: 0,
            player_y: tuning.surface_center_y(),
            obstacles: Vec::new(),
            pickups: Vec::new(),
            wall_cursor: SpawnCursor::default(),
            pickup_cursor: SpawnCursor::default(),
            frame: 0,
            tuning,
        }
    }

    /// Reset every counter and enter `Running` for `name`
    pub fn begin_run(&mut self, name: &str) {
        self.player_name = name.to_string();
        self.power = self.tuning.start_power;
        self.elapsed_seconds = 0;
        self.player_y = self.tuning.surface_center_y();
        self.obstacles.clear();
        self.pickups.clear();
        self.wall_cursor = SpawnCursor::default();
        self.pickup_cursor = SpawnCursor::default();
        self.frame = 0;
        self.phase = RunPhase::Running;
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, RunPhase::Ended(_))
    }

    /// Add power, capped at the meter's maximum
    pub fn recharge(&mut self, amount: u8) {
        self.power = self.power.saturating_add(amount).min(self.tuning.max_power);
    }

    /// Move to the terminal phase. Only the first ending counts.
    pub fn end(&mut self, reason: EndReason) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        self.phase = RunPhase::Ended(reason);
        true
    }

    /// Result payload for an ended run
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            RunPhase::Ended(reason) => Some(RunOutcome {
                player_name: self.player_name.clone(),
                elapsed_seconds: self.elapsed_seconds,
                reason,
                final_power: self.power,
            }),
            _ => None,
        }
    }
}
