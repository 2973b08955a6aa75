//! Frame and timer scheduling
//!
//! The game runs on one thread with three wake-up sources: an animation
//! frame callback and two fixed-period timers. [`Scheduler`] is the seam
//! between the run lifecycle and whatever delivers those wake-ups: the
//! browser (`setInterval` / `requestAnimationFrame`) or [`VirtualScheduler`]
//! for tests and headless runs.

use std::collections::BTreeMap;

use thiserror::Error;

/// The periodic timers a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timer {
    /// Once per second: elapsed time up, power down
    PowerClock,
    /// Held-key sampling
    InputSampler,
}

/// Handle for one started interval. Stopping is by handle, so two starts
/// of the same [`Timer`] are two independent intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub i32);

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("host refused to start {timer:?} timer: {reason}")]
    Unavailable { timer: Timer, reason: String },
}

/// Something that can deliver frame and timer wake-ups
pub trait Scheduler {
    /// Start a repeating interval
    fn start_timer(&mut self, timer: Timer, period_ms: u32) -> Result<TimerId, ScheduleError>;
    /// Cancel an interval. Unknown handles are ignored.
    fn stop_timer(&mut self, id: TimerId);
    /// Ask for one frame callback. Repeated requests before the frame
    /// arrives collapse into one.
    fn request_frame(&mut self);
}

/// A wake-up delivered by [`VirtualScheduler::next_wakeup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Frame,
    Timer(Timer),
}

#[derive(Debug, Clone)]
struct Interval {
    timer: Timer,
    period_ms: f64,
    next_due_ms: f64,
}

/// Deterministic scheduler over a virtual millisecond clock.
///
/// Intervals behave like browser intervals: each start gets its own handle
/// and keeps firing until that handle is stopped.
#[derive(Debug, Clone)]
pub struct VirtualScheduler {
    now_ms: f64,
    next_id: i32,
    intervals: BTreeMap<TimerId, Interval>,
    /// Frame cadence; `None` means frame requests are dropped
    frame_period_ms: Option<f64>,
    frame_due_ms: Option<f64>,
}

impl VirtualScheduler {
    /// Frames every `frame_period_ms` (e.g. 1000/60)
    pub fn new(frame_period_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            next_id: 1,
            intervals: BTreeMap::new(),
            frame_period_ms: Some(frame_period_ms),
            frame_due_ms: None,
        }
    }

    /// Timers only; frame requests never fire
    pub fn without_frames() -> Self {
        Self {
            frame_period_ms: None,
            ..Self::new(0.0)
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Live intervals for `timer`
    pub fn active_count(&self, timer: Timer) -> usize {
        self.intervals.values().filter(|i| i.timer == timer).count()
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_due_ms.is_some()
    }

    /// Pop the earliest wake-up due at or before `until_ms`, advancing the
    /// clock to it. Timers win ties with frames; equal timers fire in
    /// handle order. Returns `None` (with the clock at `until_ms`) once
    /// nothing else is due.
    pub fn next_wakeup(&mut self, until_ms: f64) -> Option<Wakeup> {
        let timer = self
            .intervals
            .iter()
            .min_by(|a, b| a.1.next_due_ms.total_cmp(&b.1.next_due_ms).then(a.0.cmp(b.0)))
            .map(|(id, i)| (*id, i.next_due_ms));

        match (timer, self.frame_due_ms) {
            (Some((id, due)), frame) if due <= until_ms && frame.is_none_or(|f| due <= f) => {
                self.now_ms = due;
                let interval = self.intervals.get_mut(&id)?;
                interval.next_due_ms += interval.period_ms;
                Some(Wakeup::Timer(interval.timer))
            }
            (_, Some(frame)) if frame <= until_ms => {
                self.now_ms = frame;
                self.frame_due_ms = None;
                Some(Wakeup::Frame)
            }
            _ => {
                self.now_ms = self.now_ms.max(until_ms);
                None
            }
        }
    }
}

impl Scheduler for VirtualScheduler {
    fn start_timer(&mut self, timer: Timer, period_ms: u32) -> Result<TimerId, ScheduleError> {
        if period_ms == 0 {
            return Err(ScheduleError::Unavailable {
                timer,
                reason: "zero period".into(),
            });
        }
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let period_ms = period_ms as f64;
        self.intervals.insert(
            id,
            Interval {
                timer,
                period_ms,
                next_due_ms: self.now_ms + period_ms,
            },
        );
        Ok(id)
    }

    fn stop_timer(&mut self, id: TimerId) {
        self.intervals.remove(&id);
    }

    fn request_frame(&mut self) {
        if let (Some(period), None) = (self.frame_period_ms, self.frame_due_ms) {
            self.frame_due_ms = Some(self.now_ms + period);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sched: &mut VirtualScheduler, until_ms: f64) -> Vec<(f64, Wakeup)> {
        let mut out = Vec::new();
        while let Some(w) = sched.next_wakeup(until_ms) {
            out.push((sched.now_ms(), w));
        }
        out
    }

    #[test]
    fn test_interval_fires_each_period() {
        let mut sched = VirtualScheduler::without_frames();
        sched.start_timer(Timer::PowerClock, 1000).unwrap();
        let fired = drain(&mut sched, 3500.0);
        assert_eq!(
            fired,
            vec![
                (1000.0, Wakeup::Timer(Timer::PowerClock)),
                (2000.0, Wakeup::Timer(Timer::PowerClock)),
                (3000.0, Wakeup::Timer(Timer::PowerClock)),
            ]
        );
        assert_eq!(sched.now_ms(), 3500.0);
    }

    #[test]
    fn test_duplicate_starts_both_fire() {
        let mut sched = VirtualScheduler::without_frames();
        let a = sched.start_timer(Timer::PowerClock, 1000).unwrap();
        let b = sched.start_timer(Timer::PowerClock, 1000).unwrap();
        assert_ne!(a, b);
        assert_eq!(drain(&mut sched, 1000.0).len(), 2);

        sched.stop_timer(a);
        assert_eq!(sched.active_count(Timer::PowerClock), 1);
        assert_eq!(drain(&mut sched, 2000.0).len(), 1);
    }

    #[test]
    fn test_frame_requests_collapse() {
        let mut sched = VirtualScheduler::new(16.0);
        sched.request_frame();
        sched.request_frame();
        assert_eq!(drain(&mut sched, 100.0), vec![(16.0, Wakeup::Frame)]);
        assert!(!sched.frame_pending());
    }

    #[test]
    fn test_frames_disabled() {
        let mut sched = VirtualScheduler::without_frames();
        sched.request_frame();
        assert!(!sched.frame_pending());
        assert!(sched.next_wakeup(1000.0).is_none());
    }

    #[test]
    fn test_interleaving_is_time_ordered() {
        let mut sched = VirtualScheduler::new(20.0);
        sched.start_timer(Timer::InputSampler, 30).unwrap();
        sched.request_frame();
        let fired = drain(&mut sched, 35.0);
        assert_eq!(
            fired,
            vec![
                (20.0, Wakeup::Frame),
                (30.0, Wakeup::Timer(Timer::InputSampler)),
            ]
        );
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut sched = VirtualScheduler::without_frames();
        assert!(sched.start_timer(Timer::InputSampler, 0).is_err());
    }
}
