//! Battery Dash - a side-scrolling wall-dodging arcade game
//!
//! Core modules:
//! - `sim`: Simulation (spawning, motion, collisions, power/time bookkeeping)
//! - `session`: Run lifecycle and timer ownership
//! - `schedule`: Frame/timer scheduling seam (browser or virtual clock)
//! - `renderer`: Drawing surface abstraction and frame composition
//! - `hud`: Presentation helpers (clock text, power colours, result text)
//! - `assets`: Image manifest and load tracking
//! - `settings` / `tuning`: Configuration and data-driven game balance

pub mod assets;
pub mod hud;
pub mod renderer;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration defaults
pub mod consts {
    /// Drawing surface dimensions (pixels)
    pub const SURFACE_WIDTH: f32 = 1000.0;
    pub const SURFACE_HEIGHT: f32 = 600.0;

    /// Player sprite occupies a fixed horizontal band
    pub const PLAYER_X: f32 = 50.0;
    pub const PLAYER_SIZE: f32 = 50.0;
    /// Vertical distance moved per input sample
    pub const PLAYER_STEP: f32 = 10.0;

    /// Walls
    pub const WALL_WIDTH: f32 = 50.0;
    pub const WALL_MIN_HEIGHT: u32 = 100;
    pub const WALL_MAX_HEIGHT: u32 = 500; // exclusive
    /// Horizontal travel between consecutive spawns
    pub const SPAWN_SPACING: f32 = 300.0;
    /// Leftward scroll per frame
    pub const SCROLL_SPEED: f32 = 4.0;

    /// Batteries
    pub const PICKUP_RADIUS: f32 = 15.0;
    /// Vertical clearance kept between a new battery and the latest wall
    pub const PICKUP_MARGIN: f32 = 25.0;
    /// Batteries spawn with y in [0, height - PICKUP_FLOOR)
    pub const PICKUP_FLOOR: f32 = 50.0;
    /// Vertical tolerance for collecting a battery (wider than the sprite)
    pub const PICKUP_REACH: f32 = 50.0;
    pub const PICKUP_POWER: u8 = 5;
    pub const MAX_PICKUP_ATTEMPTS: u32 = 64;

    /// Power meter
    pub const START_POWER: u8 = 50;
    pub const MAX_POWER: u8 = 100;

    /// Timer periods
    pub const CLOCK_PERIOD_MS: u32 = 1000;
    pub const INPUT_PERIOD_MS: u32 = 30;

    /// Give up on image loading after this long
    pub const ASSET_TIMEOUT_MS: u32 = 10_000;
}
