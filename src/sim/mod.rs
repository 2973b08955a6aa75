//! Simulation module
//!
//! All gameplay logic lives here. No rendering or platform dependencies:
//! - Randomness comes from the caller's RNG
//! - Walls and batteries are kept in spawn order
//! - Timing is supplied by the caller (frames, seconds, input samples)

pub mod autopilot;
pub mod collision;
pub mod input;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{PlayerBand, Span, obstacle_hits_player, pickup_touches_player};
pub use input::{Action, InputTracker, KeyBindings};
pub use spawn::SpawnCursor;
pub use state::{Anchor, EndReason, GameState, Obstacle, Pickup, RunOutcome, RunPhase};
pub use tick::{FrameReport, input_tick, power_tick, step_frame};
