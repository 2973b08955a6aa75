//! Image asset tracking
//!
//! The first frame needs every sprite. [`AssetTracker`] collects per-image
//! load results and reports a single terminal event: all ready, or failed
//! (an image errored, or the deadline passed first).

use std::collections::BTreeSet;

use thiserror::Error;

/// Named image resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sprite {
    Player,
    Background,
}

impl Sprite {
    pub const ALL: [Sprite; 2] = [Sprite::Player, Sprite::Background];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("failed to load {sprite:?} image from {url}")]
    Failed { sprite: Sprite, url: String },
    #[error("timed out after {waited_ms}ms waiting for {pending:?}")]
    TimedOut { pending: Vec<Sprite>, waited_ms: u32 },
}

/// Terminal result of loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Ready,
    Failed(AssetError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Loading,
    Done,
}

/// Waits for a fixed set of sprites
#[derive(Debug, Clone)]
pub struct AssetTracker {
    pending: BTreeSet<Sprite>,
    started_ms: f64,
    timeout_ms: u32,
    state: LoadState,
}

impl AssetTracker {
    pub fn new(sprites: &[Sprite], started_ms: f64, timeout_ms: u32) -> Self {
        Self {
            pending: sprites.iter().copied().collect(),
            started_ms,
            timeout_ms,
            state: LoadState::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Loaded and nothing failed
    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Done && self.pending.is_empty()
    }

    /// Loading finished or failed; only the call completing the set
    /// returns `Some(Ready)`.
    pub fn mark_loaded(&mut self, sprite: Sprite) -> Option<LoadEvent> {
        if !self.is_loading() {
            return None;
        }
        self.pending.remove(&sprite);
        log::debug!("Loaded {:?}, {} remaining", sprite, self.pending.len());
        if self.pending.is_empty() {
            self.state = LoadState::Done;
            return Some(LoadEvent::Ready);
        }
        None
    }

    pub fn mark_failed(&mut self, sprite: Sprite, url: &str) -> Option<LoadEvent> {
        if !self.is_loading() {
            return None;
        }
        self.state = LoadState::Done;
        Some(LoadEvent::Failed(AssetError::Failed {
            sprite,
            url: url.to_string(),
        }))
    }

    /// Check the deadline at `now_ms`
    pub fn poll(&mut self, now_ms: f64) -> Option<LoadEvent> {
        if !self.is_loading() {
            return None;
        }
        let waited = now_ms - self.started_ms;
        if waited < self.timeout_ms as f64 {
            return None;
        }
        self.state = LoadState::Done;
        Some(LoadEvent::Failed(AssetError::TimedOut {
            pending: self.pending.iter().copied().collect(),
            waited_ms: waited as u32,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_fires_once() {
        let mut assets = AssetTracker::new(&Sprite::ALL, 0.0, 1000);
        assert_eq!(assets.mark_loaded(Sprite::Background), None);
        assert_eq!(assets.mark_loaded(Sprite::Background), None);
        assert!(!assets.is_ready());
        assert_eq!(assets.mark_loaded(Sprite::Player), Some(LoadEvent::Ready));
        assert!(assets.is_ready());
        assert_eq!(assets.mark_loaded(Sprite::Player), None);
        assert_eq!(assets.poll(5000.0), None);
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut assets = AssetTracker::new(&Sprite::ALL, 100.0, 1000);
        assets.mark_loaded(Sprite::Player);
        assert_eq!(assets.poll(1099.0), None);
        assert_eq!(
            assets.poll(1100.0),
            Some(LoadEvent::Failed(AssetError::TimedOut {
                pending: vec![Sprite::Background],
                waited_ms: 1000,
            }))
        );
        assert_eq!(assets.poll(2000.0), None);
        assert_eq!(assets.mark_loaded(Sprite::Background), None);
        assert!(!assets.is_ready());
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut assets = AssetTracker::new(&Sprite::ALL, 0.0, 1000);
        let event = assets.mark_failed(Sprite::Player, "img/kvad.png");
        assert!(matches!(
            event,
            Some(LoadEvent::Failed(AssetError::Failed {
                sprite: Sprite::Player,
                ..
            }))
        ));
        assert_eq!(assets.mark_loaded(Sprite::Background), None);
        assert_eq!(assets.mark_failed(Sprite::Background, "x"), None);
        assert!(!assets.is_ready());
    }
}
