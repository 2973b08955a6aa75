//! Run lifecycle
//!
//! `Session` owns the game state and both timers. Every transition that
//! starts or ends a run stops the live timers first, so a run never has more
//! than one power clock or input sampler mutating it.
//!
//! ```text
//! Idle --start(name)--> Running --power 0--> Ended(Depleted)
//!                          |  \--wall hit--> Ended(Collided)
//!                          ^--------restart()-------/
//! ```

use rand::SeedableRng;
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::schedule::{ScheduleError, Scheduler, Timer, TimerId, VirtualScheduler, Wakeup};
use crate::settings::Settings;
use crate::sim::autopilot;
use crate::sim::{
    FrameReport, GameState, InputTracker, RunOutcome, RunPhase, input_tick, power_tick,
    step_frame,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("no finished run to restart")]
    NothingToRestart,
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Handles of the intervals belonging to the current run
#[derive(Debug, Default)]
struct RunTimers {
    clock: Option<TimerId>,
    input: Option<TimerId>,
}

/// One player's sequence of runs
pub struct Session {
    state: GameState,
    input: InputTracker,
    rng: Pcg32,
    timers: RunTimers,
    outcome: Option<RunOutcome>,
    autopilot: bool,
}

impl Session {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            state: GameState::new(settings.tuning.clone()),
            input: InputTracker::new(settings.bindings.clone()),
            rng: Pcg32::seed_from_u64(seed),
            timers: RunTimers::default(),
            outcome: None,
            autopilot: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    /// Result of the last finished run, until the next one starts
    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    pub fn key_down(&mut self, key: &str) {
        self.input.key_down(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Forget held keys (e.g. the window lost focus)
    pub fn release_keys(&mut self) {
        self.input.release_all();
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
        if !on {
            self.input.release_all();
        }
    }

    /// Begin a run for `name` (leading/trailing whitespace ignored)
    pub fn start<S: Scheduler + ?Sized>(
        &mut self,
        name: &str,
        sched: &mut S,
    ) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        self.launch(name.to_string(), sched)
    }

    /// Start a fresh run for the same player
    pub fn restart<S: Scheduler + ?Sized>(&mut self, sched: &mut S) -> Result<(), SessionError> {
        if self.state.phase == RunPhase::Idle {
            return Err(SessionError::NothingToRestart);
        }
        let name = self.state.player_name.clone();
        self.launch(name, sched)
    }

    fn launch<S: Scheduler + ?Sized>(
        &mut self,
        name: String,
        sched: &mut S,
    ) -> Result<(), SessionError> {
        self.stop_timers(sched);
        self.state.begin_run(&name);
        self.input.release_all();
        self.outcome = None;

        if let Err(e) = self.start_timers(sched) {
            self.stop_timers(sched);
            self.state.phase = RunPhase::Idle;
            return Err(e.into());
        }
        sched.request_frame();

        log::info!("Run started for {:?}", name);
        Ok(())
    }

    fn start_timers<S: Scheduler + ?Sized>(&mut self, sched: &mut S) -> Result<(), ScheduleError> {
        let tuning = &self.state.tuning;
        let (clock_ms, input_ms) = (tuning.clock_period_ms, tuning.input_period_ms);
        self.timers.clock = Some(sched.start_timer(Timer::PowerClock, clock_ms)?);
        self.timers.input = Some(sched.start_timer(Timer::InputSampler, input_ms)?);
        Ok(())
    }

    fn stop_timers<S: Scheduler + ?Sized>(&mut self, sched: &mut S) {
        if let Some(id) = self.timers.clock.take() {
            sched.stop_timer(id);
        }
        if let Some(id) = self.timers.input.take() {
            sched.stop_timer(id);
        }
    }

    fn finish<S: Scheduler + ?Sized>(&mut self, sched: &mut S) {
        self.stop_timers(sched);
        self.outcome = self.state.outcome();
        if let Some(outcome) = &self.outcome {
            log::info!(
                "Run over ({:?}) for {:?} after {}s with {}% power",
                outcome.reason,
                outcome.player_name,
                outcome.elapsed_seconds,
                outcome.final_power
            );
        }
    }

    /// Animation frame callback
    pub fn on_frame<S: Scheduler + ?Sized>(&mut self, sched: &mut S) -> FrameReport {
        if !self.state.is_running() {
            return FrameReport::default();
        }
        if self.autopilot {
            autopilot::steer(&self.state, &mut self.input);
        }
        let report = step_frame(&mut self.state, &mut self.rng);
        if self.state.is_over() {
            self.finish(sched);
        } else {
            sched.request_frame();
        }
        report
    }

    /// Interval callback
    pub fn on_timer<S: Scheduler + ?Sized>(&mut self, timer: Timer, sched: &mut S) {
        match timer {
            Timer::PowerClock => {
                if power_tick(&mut self.state) {
                    self.finish(sched);
                }
            }
            Timer::InputSampler => input_tick(&mut self.state, &self.input),
        }
    }

    /// Route one virtual wake-up
    pub fn dispatch(&mut self, wakeup: Wakeup, sched: &mut VirtualScheduler) {
        match wakeup {
            Wakeup::Frame => {
                self.on_frame(sched);
            }
            Wakeup::Timer(timer) => self.on_timer(timer, sched),
        }
    }

    /// Deliver every virtual wake-up due up to `until_ms`
    pub fn run_until(&mut self, sched: &mut VirtualScheduler, until_ms: f64) {
        while let Some(wakeup) = sched.next_wakeup(until_ms) {
            self.dispatch(wakeup, sched);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud;
    use crate::sim::{Anchor, EndReason, Obstacle, Pickup};

    const FRAME_MS: f64 = 16.0;

    fn session() -> Session {
        Session::new(&Settings::default(), 42)
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut s = session();
        let mut sched = VirtualScheduler::without_frames();
        assert!(matches!(s.start("   ", &mut sched), Err(SessionError::EmptyName)));
        assert_eq!(s.phase(), RunPhase::Idle);
        assert_eq!(sched.active_count(Timer::PowerClock), 0);
    }

    #[test]
    fn test_restart_needs_a_run() {
        let mut s = session();
        let mut sched = VirtualScheduler::without_frames();
        assert!(matches!(
            s.restart(&mut sched),
            Err(SessionError::NothingToRestart)
        ));
    }

    #[test]
    fn test_start_resets_and_schedules() {
        let mut s = session();
        let mut sched = VirtualScheduler::new(FRAME_MS);
        s.start(" A ", &mut sched).unwrap();

        assert_eq!(s.phase(), RunPhase::Running);
        assert_eq!(s.state().player_name, "A");
        assert_eq!(s.state().power, 50);
        assert_eq!(s.state().elapsed_seconds, 0);
        assert_eq!(s.state().player_y, 300.0);
        assert_eq!(sched.active_count(Timer::PowerClock), 1);
        assert_eq!(sched.active_count(Timer::InputSampler), 1);
        assert!(sched.frame_pending());
    }

    #[test]
    fn test_depletion_after_fifty_seconds() {
        let mut s = session();
        let mut sched = VirtualScheduler::without_frames();
        s.start("A", &mut sched).unwrap();

        s.run_until(&mut sched, 49_999.0);
        assert_eq!(s.phase(), RunPhase::Running);
        assert_eq!(s.state().power, 1);

        s.run_until(&mut sched, 50_000.0);
        assert_eq!(s.phase(), RunPhase::Ended(EndReason::Depleted));
        assert_eq!(s.state().power, 0);
        assert_eq!(hud::format_clock(s.state().elapsed_seconds), "00:50");

        let outcome = s.outcome().unwrap();
        assert_eq!(outcome.player_name, "A");
        assert_eq!(outcome.elapsed_seconds, 50);
        assert_eq!(outcome.final_power, 0);

        // Both timers were stopped on the way out
        assert_eq!(sched.active_count(Timer::PowerClock), 0);
        assert_eq!(sched.active_count(Timer::InputSampler), 0);
        s.run_until(&mut sched, 60_000.0);
        assert_eq!(s.state().elapsed_seconds, 50);
    }

    fn collide_at_frame(s: &mut Session, sched: &mut VirtualScheduler, k: u64) {
        s.start("A", sched).unwrap();
        // Covers the whole top half; reaches x < 100 on frame k
        let x = s.state.tuning.player_right() + s.state.tuning.scroll_speed * k as f32 - 2.0;
        let half = s.state.tuning.surface_center_y();
        s.state
            .obstacles
            .push(Obstacle::anchored(x, half, Anchor::Top, s.state.tuning.surface_height));
        s.run_until(sched, 1000.0);
    }

    #[test]
    fn test_wall_ends_run_on_exact_frame() {
        let mut s = session();
        let mut sched = VirtualScheduler::new(FRAME_MS);
        collide_at_frame(&mut s, &mut sched, 10);

        assert_eq!(s.phase(), RunPhase::Ended(EndReason::Collided));
        assert_eq!(s.state().frame, 10);
        assert_eq!(s.outcome().map(|o| o.reason), Some(EndReason::Collided));
        assert!(!sched.frame_pending(), "no frames after the end");
        assert_eq!(sched.active_count(Timer::PowerClock), 0);
    }

    #[test]
    fn test_restart_after_collision_ticks_once() {
        let mut s = session();
        let mut sched = VirtualScheduler::new(FRAME_MS);
        collide_at_frame(&mut s, &mut sched, 5);
        assert!(s.state().is_over());

        s.restart(&mut sched).unwrap();
        assert_eq!(s.phase(), RunPhase::Running);
        assert_eq!(s.state().power, 50);
        assert_eq!(s.state().elapsed_seconds, 0);
        assert!(s.state().obstacles.is_empty());
        assert!(s.state().pickups.is_empty());
        assert!(s.outcome().is_none());

        let restarted_at = sched.now_ms();
        s.run_until(&mut sched, restarted_at + 1000.0);
        assert_eq!(s.state().power, 49);
        assert_eq!(s.state().elapsed_seconds, 1);
    }

    #[test]
    fn test_restart_while_running_does_not_leak_timers() {
        let mut s = session();
        let mut sched = VirtualScheduler::without_frames();
        s.start("A", &mut sched).unwrap();
        s.restart(&mut sched).unwrap();
        s.restart(&mut sched).unwrap();

        assert_eq!(sched.active_count(Timer::PowerClock), 1);
        assert_eq!(sched.active_count(Timer::InputSampler), 1);
        s.run_until(&mut sched, 3000.0);
        assert_eq!(s.state().power, 47);
    }

    #[test]
    fn test_held_key_moves_player_on_sampler() {
        let mut s = session();
        let mut sched = VirtualScheduler::without_frames();
        s.start("A", &mut sched).unwrap();
        s.key_down("W");
        s.run_until(&mut sched, 90.0);
        assert_eq!(s.state().player_y, 270.0);
        s.key_up("w");
        s.run_until(&mut sched, 300.0);
        assert_eq!(s.state().player_y, 270.0);
    }

    #[test]
    fn test_configured_binding_ignores_case() {
        let settings = Settings::from_json(r#"{ "bindings": { "up": ["ArrowUp"] } }"#).unwrap();
        let mut s = Session::new(&settings, 42);
        let mut sched = VirtualScheduler::without_frames();
        s.start("A", &mut sched).unwrap();
        s.key_down("ArrowUp");
        s.run_until(&mut sched, 90.0);
        assert_eq!(s.state().player_y, 270.0);
    }

    #[test]
    fn test_pickup_recharges_through_frame() {
        let mut s = session();
        let mut sched = VirtualScheduler::new(FRAME_MS);
        s.start("A", &mut sched).unwrap();
        s.state.power = 98;
        let y = s.state.player_y;
        s.state.pickups.push(Pickup { x: 75.0, y });

        let report = s.on_frame(&mut sched);
        assert_eq!(report.collected, 1);
        assert_eq!(s.state().power, 100);
    }

    #[test]
    fn test_stale_frame_after_end_is_ignored() {
        let mut s = session();
        let mut sched = VirtualScheduler::new(FRAME_MS);
        collide_at_frame(&mut s, &mut sched, 3);
        let frame = s.state().frame;
        let report = s.on_frame(&mut sched);
        assert!(!report.simulated);
        assert_eq!(s.state().frame, frame);
        assert!(!sched.frame_pending());
    }

    #[test]
    fn test_autopilot_forces_movement() {
        let mut s = session();
        let mut sched = VirtualScheduler::new(FRAME_MS);
        s.start("bot", &mut sched).unwrap();
        s.set_autopilot(true);
        s.state
            .obstacles
            .push(Obstacle::anchored(600.0, 450.0, Anchor::Top, 600.0));
        s.state.wall_cursor.mark(600.0);
        s.on_frame(&mut sched);
        s.on_timer(Timer::InputSampler, &mut sched);
        assert!(s.state().player_y > 300.0);
    }
}
