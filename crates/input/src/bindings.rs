use std::collections::BTreeMap;

use blocky_common::Direction;
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Forward,
    Backward,
    Left,
    Right,
    Quit,
}

impl Binding {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Binding::Forward => Some(Direction::Forward),
            Binding::Backward => Some(Direction::Backward),
            Binding::Left => Some(Direction::Left),
            Binding::Right => Some(Direction::Right),
            Binding::Quit => None,
        }
    }
}

/// Key map from key names to bindings.
///
/// Key names are the window backend's physical key names (`KeyW`,
/// `ArrowUp`, `Escape`, ...), which keeps this crate free of any windowing
/// dependency and lets the map live in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    keys: BTreeMap<String, Binding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind("KeyW", Binding::Forward);
        bindings.bind("KeyS", Binding::Backward);
        bindings.bind("KeyA", Binding::Left);
        bindings.bind("KeyD", Binding::Right);
        bindings.bind("ArrowUp", Binding::Forward);
        bindings.bind("ArrowDown", Binding::Backward);
        bindings.bind("ArrowLeft", Binding::Left);
        bindings.bind("ArrowRight", Binding::Right);
        bindings.bind("Escape", Binding::Quit);
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Bind a key, replacing any previous binding for it.
    pub fn bind(&mut self, key: impl Into<String>, binding: Binding) {
        self.keys.insert(key.into(), binding);
    }

    pub fn get(&self, key: &str) -> Option<Binding> {
        self.keys.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Translate a key transition into an action.
    ///
    /// Quit fires on press only; unbound keys map to [`Action::Noop`].
    pub fn action_for(&self, key: &str, pressed: bool) -> Action {
        match self.get(key) {
            Some(Binding::Quit) if pressed => Action::Quit,
            Some(binding) => match binding.direction() {
                Some(direction) => Action::Move {
                    direction,
                    active: pressed,
                },
                None => Action::Noop,
            },
            None => {
                tracing::trace!(key, "unbound key");
                Action::Noop
            }
        }
    }
}
