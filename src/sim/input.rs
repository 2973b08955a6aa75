//! Keyboard state tracking
//!
//! Key identifiers are the lower-cased `KeyboardEvent.key` strings. Several
//! physical layouts can feed the same logical action.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Logical movement actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
}

/// Key identifiers bound to each action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        // Latin layout plus the same physical keys on a Russian layout
        Self {
            up: vec!["w".into(), "ц".into()],
            down: vec!["s".into(), "ы".into()],
        }
    }
}

impl KeyBindings {
    /// Lower-cased copy, matching how pressed keys are recorded
    pub fn normalized(&self) -> Self {
        fn lower(keys: &[String]) -> Vec<String> {
            keys.iter().map(|k| k.to_lowercase()).collect()
        }
        Self {
            up: lower(&self.up),
            down: lower(&self.down),
        }
    }

    /// First key bound to both actions
    pub fn conflict(&self) -> Option<&str> {
        self.up
            .iter()
            .find(|k| self.down.iter().any(|d| d.to_lowercase() == k.to_lowercase()))
            .map(String::as_str)
    }

    /// Action bound to `key`, if any
    pub fn action_for(&self, key: &str) -> Option<Action> {
        if self.up.iter().any(|k| k == key) {
            Some(Action::Up)
        } else if self.down.iter().any(|k| k == key) {
            Some(Action::Down)
        } else {
            None
        }
    }
}

/// Currently held keys
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    bindings: KeyBindings,
    held: HashSet<String>,
    /// Actions forced on by the autopilot
    forced: HashSet<Action>,
}

impl InputTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings: bindings.normalized(),
            held: HashSet::new(),
            forced: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.held.insert(key.to_lowercase());
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&key.to_lowercase());
    }

    /// Forget every held key (window lost focus, new run)
    pub fn release_all(&mut self) {
        self.held.clear();
        self.forced.clear();
    }

    /// Override an action independently of the keyboard
    pub fn set_forced(&mut self, action: Action, on: bool) {
        if on {
            self.forced.insert(action);
        } else {
            self.forced.remove(&action);
        }
    }

    /// True if any key bound to `action` is down
    pub fn is_held(&self, action: Action) -> bool {
        self.forced.contains(&action)
            || self
                .held
                .iter()
                .any(|key| self.bindings.action_for(key) == Some(action))
    }
}
