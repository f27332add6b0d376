//! Attribute subscription fan-out (§4.6).
//!
//! rs-matter's own subscription engine watches a cluster's [`Dataver`] and
//! needs no help from here — see `sync_dataver_with_sensor` in
//! [`crate::matter::clusters`]. This module is the other direction: for
//! every bridged endpoint, wake up whenever its state changes and forward
//! a structured message to the frontend collaborator, independently of
//! whether any Matter controller happens to be subscribed right now.
//!
//! [`Dataver`]: rs_matter::dm::Dataver

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::frontend::{AttributeChanged, Frontend};
use crate::matter::clusters::{HumiditySensor, TemperatureSensor};
use crate::matter::endpoints::endpoints_helpers::{ClusterNotifier, NotifiableSensor};
use crate::matter::endpoints::sensors::helpers::BinarySensorHelper;

/// How often [`AttributeFanout::watch_temperature`]/[`AttributeFanout::watch_humidity`]
/// re-check their sensor's version counter.
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// Every `(cluster, attribute)` pair this bridge watches when present on a
/// bridged endpoint (§4.6's fixed allow-list). Only the clusters this
/// bridge actually implements today ever get a `watch_*` call; the rest
/// are kept here, named the way the spec names them, so the allow-list
/// stays complete even as cluster coverage grows.
pub const ALLOW_LIST: &[&str] = &[
    "LevelControl.CurrentLevel",
    "ColorControl.CurrentHue",
    "OnOff.OnOff",
    "Thermostat.LocalTemperature",
    "WindowCovering.CurrentPositionLiftPercentage",
    "DoorLock.LockState",
    "FanControl.PercentCurrent",
    "BooleanState.StateValue",
    "OccupancySensing.Occupancy",
    "IlluminanceMeasurement.MeasuredValue",
    "TemperatureMeasurement.MeasuredValue",
    "RelativeHumidityMeasurement.MeasuredValue",
    "PressureMeasurement.MeasuredValue",
    "FlowMeasurement.MeasuredValue",
    "TotalVolatileOrganicCompoundsConcentrationMeasurement.MeasuredValue",
    "AirQuality.AirQuality",
    "SmokeCoAlarm.SmokeState",
    "ModeSelect.CurrentMode",
    "ServiceArea.SelectedAreas",
    "RvcRunMode.CurrentMode",
    "RvcCleanMode.CurrentMode",
    "RvcOperationalState.OperationalState",
    "BridgedDeviceBasicInformation.Reachable",
    "BasicInformation.Reachable",
];

/// A stable identifier for a bridged endpoint's logical identity, distinct
/// from the Matter-assigned endpoint number — the number only exists once
/// a node is built and can shift across a topology rebuild, while a
/// plugin's own identity for the endpoint never changes. Hashed from
/// `(plugin, label)`, the same way [`crate::matter::virtual_device`]
/// derives its schema hashes.
fn stable_endpoint_id(plugin: &str, label: &str) -> u32 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    plugin.hash(&mut hasher);
    label.hash(&mut hasher);
    hasher.finish() as u32
}

/// Where one subscribed attribute's changes get forwarded.
#[derive(Clone)]
pub struct SubscriptionTarget {
    pub plugin: String,
    pub serial: String,
    pub unique_id: String,
    pub endpoint_number: u16,
    pub label: String,
    pub cluster: u32,
    pub attribute: u32,
}

impl SubscriptionTarget {
    fn into_change(self, value: String) -> AttributeChanged {
        AttributeChanged {
            endpoint_id: stable_endpoint_id(&self.plugin, &self.label),
            plugin: self.plugin,
            serial: self.serial,
            unique_id: self.unique_id,
            endpoint_number: self.endpoint_number,
            cluster: self.cluster,
            attribute: self.attribute,
            value,
        }
    }
}

/// Owns every background task spawned to fan out bridged-endpoint changes.
/// Dropping it aborts every subscription — used at topology teardown
/// (§4.7 "stop server nodes in the current mode").
#[derive(Default)]
pub struct AttributeFanout {
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl AttributeFanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes currently being watched.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// BooleanState/OccupancySensing: watch a binary sensor, forwarding
    /// `"true"`/`"false"`.
    pub fn watch_bool(
        &mut self,
        sensor: Arc<BinarySensorHelper>,
        target: SubscriptionTarget,
        frontend: Arc<dyn Frontend>,
    ) {
        let notifier = ClusterNotifier::new();
        sensor.set_notifier(notifier.clone());
        self.tasks.push(tokio::spawn(async move {
            loop {
                notifier.wait().await;
                frontend.attribute_changed(target.clone().into_change(sensor.get().to_string()));
            }
        }));
    }

    /// TemperatureMeasurement: watch a temperature sensor, forwarding
    /// degrees Celsius. `TemperatureSensor` only bumps a version counter on
    /// change (there is no [`ClusterNotifier`] wired into it, unlike the
    /// binary sensors), so this polls the counter instead of waiting on it.
    pub fn watch_temperature(
        &mut self,
        sensor: Arc<TemperatureSensor>,
        target: SubscriptionTarget,
        frontend: Arc<dyn Frontend>,
    ) {
        let mut last_version = sensor.version();
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            loop {
                ticker.tick().await;
                let version = sensor.version();
                if version != last_version {
                    last_version = version;
                    frontend.attribute_changed(target.clone().into_change(sensor.get_celsius().to_string()));
                }
            }
        }));
    }

    /// RelativeHumidityMeasurement: watch a humidity sensor, forwarding
    /// relative humidity percent. Polled for the same reason as
    /// [`Self::watch_temperature`].
    pub fn watch_humidity(
        &mut self,
        sensor: Arc<HumiditySensor>,
        target: SubscriptionTarget,
        frontend: Arc<dyn Frontend>,
    ) {
        let mut last_version = sensor.version();
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            loop {
                ticker.tick().await;
                let version = sensor.version();
                if version != last_version {
                    last_version = version;
                    frontend.attribute_changed(target.clone().into_change(sensor.get_percent().to_string()));
                }
            }
        }));
    }
}

impl Drop for AttributeFanout {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::NullFrontend;

    fn target() -> SubscriptionTarget {
        SubscriptionTarget {
            plugin: "plugin-a".into(),
            serial: "serial-1".into(),
            unique_id: "unique-1".into(),
            endpoint_number: 3,
            label: "Door Sensor".into(),
            cluster: 0x0045,
            attribute: 0x00,
        }
    }

    #[test]
    fn stable_endpoint_id_is_deterministic_and_plugin_scoped() {
        let a = stable_endpoint_id("plugin-a", "Door Sensor");
        let b = stable_endpoint_id("plugin-a", "Door Sensor");
        let c = stable_endpoint_id("plugin-b", "Door Sensor");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn watch_bool_forwards_on_change() {
        let sensor = Arc::new(BinarySensorHelper::new(false));
        let mut fanout = AttributeFanout::new();
        fanout.watch_bool(sensor.clone(), target(), Arc::new(NullFrontend));
        assert_eq!(fanout.len(), 1);
        sensor.set(true);
        tokio::task::yield_now().await;
    }
}
