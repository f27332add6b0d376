//! Generic binary sensor state for Matter BooleanState / OccupancySensing.
//!
//! Mirrors [`crate::matter::endpoints::controls::helpers::BinarySwitchHelper`]
//! but is one-directional: a plugin updates the value via `set()`, Matter
//! clusters only ever read it. There is no `on_command` path because a
//! contact or occupancy sensor has no writable attribute.

use crate::matter::endpoints::endpoints_helpers::{ClusterNotifier, NotifiableSensor, Sensor};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Thread-safe binary sensor state (contact, occupancy, ...).
pub struct BinarySensorHelper {
    state: AtomicBool,
    version: AtomicU32,
    notifier: RwLock<Option<ClusterNotifier>>,
}

impl BinarySensorHelper {
    pub fn new(initial: bool) -> Self {
        Self {
            state: AtomicBool::new(initial),
            version: AtomicU32::new(0),
            notifier: RwLock::new(None),
        }
    }

    pub fn get(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }

    /// Update the sensor value from the owning plugin. Increments version
    /// and notifies subscribers only when the value actually changed.
    pub fn set(&self, value: bool) {
        let old = self.state.swap(value, Ordering::SeqCst);
        if old != value {
            self.version.fetch_add(1, Ordering::SeqCst);
            if let Some(notifier) = self.notifier.read().as_ref() {
                notifier.notify();
            }
        }
    }
}

impl NotifiableSensor for BinarySensorHelper {
    fn set_notifier(&self, notifier: ClusterNotifier) {
        *self.notifier.write() = Some(notifier);
    }
}

impl Sensor for BinarySensorHelper {
    fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_same_value_does_not_bump_version() {
        let sensor = BinarySensorHelper::new(false);
        sensor.set(false);
        assert_eq!(sensor.version(), 0);
        sensor.set(true);
        assert_eq!(sensor.version(), 1);
        assert!(sensor.get());
    }
}
