//! Presentation helpers
//!
//! Pure text and colour decisions for the DOM overlay; the browser glue only
//! copies these values into elements.

use crate::sim::{EndReason, GameState, RunOutcome};

/// Which overlay screen is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Name entry
    Start,
    /// No overlay, the run is live
    Playing,
    /// Power ran out
    Result,
    /// Hit a wall
    Loss,
}

impl Screen {
    pub fn for_state(state: &GameState) -> Self {
        use crate::sim::RunPhase;
        match state.phase {
            RunPhase::Idle => Screen::Start,
            RunPhase::Running => Screen::Playing,
            RunPhase::Ended(EndReason::Depleted) => Screen::Result,
            RunPhase::Ended(EndReason::Collided) => Screen::Loss,
        }
    }
}

/// Power meter colour band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTier {
    Critical,
    Low,
    Healthy,
}

impl PowerTier {
    pub fn for_power(power: u8) -> Self {
        if power < 20 {
            PowerTier::Critical
        } else if power < 40 {
            PowerTier::Low
        } else {
            PowerTier::Healthy
        }
    }

    pub fn css_color(&self) -> &'static str {
        match self {
            PowerTier::Critical => "red",
            PowerTier::Low => "orange",
            PowerTier::Healthy => "green",
        }
    }
}

/// The start button is usable once images are in and a name is typed
pub fn can_start(assets_ready: bool, name: &str) -> bool {
    assets_ready && !name.trim().is_empty()
}

/// Seconds as zero-padded `mm:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Values shown while a run is live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub name_label: String,
    pub time_label: String,
    /// Meter width in percent
    pub power_percent: u8,
    pub power_color: &'static str,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            name_label: format!("Name: {}", state.player_name),
            time_label: format!("Time: {}", format_clock(state.elapsed_seconds)),
            power_percent: state.power,
            power_color: PowerTier::for_power(state.power).css_color(),
        }
    }
}

/// Lines for the end-of-run screen. Power only shows for depletion.
pub fn outcome_lines(outcome: &RunOutcome) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", outcome.player_name),
        format!("Time: {}", format_clock(outcome.elapsed_seconds)),
    ];
    if outcome.reason == EndReason::Depleted {
        lines.push(format!("Power: {}%", outcome.final_power));
    }
    lines
}
