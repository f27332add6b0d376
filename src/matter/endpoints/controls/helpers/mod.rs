//! Shared state helpers backing the control endpoints.

mod binary_switch_helper;

pub use binary_switch_helper::BinarySwitchHelper;

/// Generic on/off switch state, shared by [`super::switch::Switch`] and
/// [`super::switch_hooks::SwitchHooks`].
pub type SwitchHelper = BinarySwitchHelper;
