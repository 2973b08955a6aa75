//! Simulation steps
//!
//! Three independent entry points, one per driver:
//! - [`step_frame`]: once per animation frame (motion, spawns, collisions)
//! - [`power_tick`]: once per second of wall-clock time (power/time decay)
//! - [`input_tick`]: at the input sampling cadence (player movement)

use rand::Rng;

use super::collision::{fatal_out_of_bounds, first_obstacle_hit, pickup_touches_player};
use super::input::{Action, InputTracker};
use super::spawn::{spawn_obstacle, spawn_pickup};
use super::state::{EndReason, GameState};

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// The frame was simulated (the run was active)
    pub simulated: bool,
    pub spawned_obstacle: bool,
    pub spawned_pickup: bool,
    /// Batteries collected this frame
    pub collected: u32,
    /// The run ended against a wall this frame
    pub collided: bool,
}

/// Advance walls and batteries by one frame
pub fn step_frame<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> FrameReport {
    let mut report = FrameReport::default();
    if !state.is_running() {
        return report;
    }
    report.simulated = true;
    state.frame += 1;
    let speed = state.tuning.scroll_speed;

    // Walls
    report.spawned_obstacle = spawn_obstacle(state, rng);
    for wall in &mut state.obstacles {
        wall.x -= speed;
    }
    state.wall_cursor.scroll(speed);

    if let Some(idx) = first_obstacle_hit(state) {
        log::debug!(
            "Wall {} hit at frame {} (player y {})",
            idx,
            state.frame,
            state.player_y
        );
        state.end(EndReason::Collided);
        report.collided = true;
        return report;
    }
    if fatal_out_of_bounds(state) {
        log::debug!("Player left the surface at frame {}", state.frame);
        state.end(EndReason::Collided);
        report.collided = true;
        return report;
    }

    // Batteries
    report.spawned_pickup = spawn_pickup(state, rng);
    for pickup in &mut state.pickups {
        pickup.x -= speed;
    }
    state.pickup_cursor.scroll(speed);
    report.collected = collect_pickups(state);

    prune_offscreen(state);
    report
}

/// Remove every battery touching the player and recharge for each.
/// Returns how many were collected.
fn collect_pickups(state: &mut GameState) -> u32 {
    let tuning = &state.tuning;
    let player_y = state.player_y;
    let before = state.pickups.len();
    state
        .pickups
        .retain(|p| !pickup_touches_player(tuning, p, player_y));
    let collected = (before - state.pickups.len()) as u32;

    for _ in 0..collected {
        state.recharge(state.tuning.pickup_power);
    }
    if collected > 0 {
        log::debug!("Collected {} battery(ies), power {}", collected, state.power);
    }
    collected
}

/// Drop entities that have scrolled fully past the left edge
fn prune_offscreen(state: &mut GameState) {
    let wall_width = state.tuning.wall_width;
    let pickup_width = state.tuning.pickup_diameter();
    state.obstacles.retain(|w| w.x + wall_width >= 0.0);
    state.pickups.retain(|p| p.x + pickup_width >= 0.0);
}

/// One second of wall-clock time. Returns true if the run ended.
pub fn power_tick(state: &mut GameState) -> bool {
    if !state.is_running() {
        return false;
    }
    state.elapsed_seconds += 1;
    state.power = state.power.saturating_sub(1);
    if state.power == 0 {
        log::debug!("Power depleted at {}s", state.elapsed_seconds);
        return state.end(EndReason::Depleted);
    }
    false
}

/// Move the player according to held keys. The centre stays within
/// `0..=surface_height`.
pub fn input_tick(state: &mut GameState, input: &InputTracker) {
    if !state.is_running() {
        return;
    }
    let step = state.tuning.player_step;
    let floor = state.tuning.surface_height;
    if input.is_held(Action::Up) && state.player_y > 0.0 {
        state.player_y = (state.player_y - step).max(0.0);
    }
    if input.is_held(Action::Down) && state.player_y < floor {
        state.player_y = (state.player_y + step).min(floor);
    }
}
