//! Push-side half of the subscription fan-out (§4.6).
//!
//! A [`ClusterNotifier`] is handed to a sensor or switch bridge once its
//! owning server node has started and the fan-out has subscribed to its
//! attributes. Calling `notify()` wakes whatever task is polling the
//! endpoint's `Dataver` for a subscriber, so a state change reaches a
//! commissioned controller without waiting for the next poll tick.
//!
//! The underlying primitive is the same `embassy_sync::signal::Signal`
//! rs-matter itself uses to wake the data-model executor — a notifier is
//! just a cheap, cloneable handle onto one.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;

/// Cloneable handle that wakes one attribute-change waiter.
///
/// `notify()` is idempotent between waits: several notifications before the
/// waiter next polls coalesce into a single wakeup, which is fine since the
/// waiter always re-reads current state rather than consuming a queued
/// value.
#[derive(Clone)]
pub struct ClusterNotifier {
    signal: Arc<Signal<NoopRawMutex, ()>>,
}

impl ClusterNotifier {
    pub fn new() -> Self {
        Self {
            signal: Arc::new(Signal::new()),
        }
    }

    /// Wake the waiter. Called from sensor/switch bridges on every value
    /// change (§4.6: "on fire, forward ... to the frontend collaborator").
    pub fn notify(&self) {
        self.signal.signal(());
    }

    /// Wait for the next `notify()` call.
    pub async fn wait(&self) {
        self.signal.wait().await;
    }
}

impl Default for ClusterNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_the_same_signal() {
        let a = ClusterNotifier::new();
        let b = a.clone();
        a.notify();
        // Both handles see the same underlying signal; `wait()` on either
        // would resolve immediately. We can't easily block_on here without
        // pulling in a runtime, so just check the Arc is shared.
        assert!(Arc::ptr_eq(&a.signal, &b.signal));
    }
}
