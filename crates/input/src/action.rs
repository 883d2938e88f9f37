use blocky_common::Direction;

/// A high-level action produced by the window layer.
///
/// The session consumes actions, never raw input events, so the desktop app
/// and headless tools drive navigation through the same vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A movement key went down (`active = true`) or up (`active = false`).
    Move { direction: Direction, active: bool },
    /// Drop every held movement key, e.g. when the window loses focus.
    ReleaseAll,
    /// The viewport changed size, in physical pixels.
    Resize { width: u32, height: u32 },
    /// Close the application.
    Quit,
    /// Input that has no binding.
    Noop,
}

impl Action {
    pub fn press(direction: Direction) -> Self {
        Self::Move {
            direction,
            active: true,
        }
    }

    pub fn release(direction: Direction) -> Self {
        Self::Move {
            direction,
            active: false,
        }
    }

    /// Action for a change of window focus.
    pub fn focus_changed(focused: bool) -> Self {
        if focused { Self::Noop } else { Self::ReleaseAll }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        assert_eq!(
            Action::press(Direction::Forward),
            Action::Move {
                direction: Direction::Forward,
                active: true
            }
        );
        assert!(matches!(
            Action::release(Direction::Left),
            Action::Move { active: false, .. }
        ));
    }

    #[test]
    fn losing_focus_releases_everything() {
        assert_eq!(Action::focus_changed(false), Action::ReleaseAll);
        assert_eq!(Action::focus_changed(true), Action::Noop);
    }
}
