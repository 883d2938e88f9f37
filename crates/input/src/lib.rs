//! Input mapping: raw key names and window events become navigation actions.
//!
//! # Invariants
//! - The navigation core consumes [`Action`]s, never raw window events.
//! - Releasing focus always produces [`Action::ReleaseAll`] so no key sticks.

pub mod action;
pub mod bindings;

pub use action::Action;
pub use bindings::{Binding, KeyBindings};

pub fn crate_info() -> &'static str {
    "blocky-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
