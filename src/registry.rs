//! Device registry (§4.3).
//!
//! An in-memory map from bridged-endpoint identity to the endpoint itself.
//! The registry is the single source of truth plugins and the commissioning
//! topology agree on: a plugin inserts via `set`, the topology walks `array`
//! to decide what to attach where, and removal always goes through this type
//! so the "devices-changed" notification (§4.9) never gets missed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::frontend::{Frontend, RefreshScope};
use crate::matter::clusters::{HumiditySensor, TemperatureSensor};
use crate::matter::endpoints::sensors::helpers::BinarySensorHelper;
use crate::subscription::{AttributeFanout, SubscriptionTarget};

/// Where a bridged endpoint attaches once its server node exists (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationalMode {
    /// Attached under the shared or per-plugin aggregator.
    Bridge,
    /// Attached directly under the root endpoint.
    Matter,
    /// Gets its own dedicated server node.
    Server,
}

/// A bridged endpoint's live sensor handle, when its cluster is one §4.6's
/// allow-list actually watches. Carried alongside the endpoint's metadata so
/// [`DeviceRegistry::set`] can start the attribute fan-out (§4.6) the moment
/// the endpoint is registered, rather than requiring a second call.
#[derive(Clone)]
pub enum SensorHandle {
    BooleanState(Arc<BinarySensorHelper>),
    OccupancySensing(Arc<BinarySensorHelper>),
    Temperature(Arc<TemperatureSensor>),
    Humidity(Arc<HumiditySensor>),
}

impl std::fmt::Debug for SensorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BooleanState(_) => "BooleanState",
            Self::OccupancySensing(_) => "OccupancySensing",
            Self::Temperature(_) => "Temperature",
            Self::Humidity(_) => "Humidity",
        };
        f.debug_tuple(name).field(&"..").finish()
    }
}

impl SensorHandle {
    /// The cluster/attribute pair §4.6 watches for this sensor kind.
    fn cluster_attribute(&self) -> (u32, u32) {
        use crate::matter::clusters::{
            boolean_state, occupancy_sensing, relative_humidity, temperature_measurement,
        };
        match self {
            Self::BooleanState(_) => (boolean_state::CLUSTER_ID, boolean_state::BooleanStateAttribute::StateValue as u32),
            Self::OccupancySensing(_) => (
                occupancy_sensing::CLUSTER_ID,
                occupancy_sensing::OccupancySensingAttribute::Occupancy as u32,
            ),
            Self::Temperature(_) => (
                temperature_measurement::CLUSTER_ID,
                temperature_measurement::TemperatureMeasurementAttribute::MeasuredValue as u32,
            ),
            Self::Humidity(_) => (
                relative_humidity::CLUSTER_ID,
                relative_humidity::RelativeHumidityAttribute::MeasuredValue as u32,
            ),
        }
    }
}

/// A bridged endpoint (§3 "Bridged endpoint").
#[derive(Debug, Clone)]
pub struct BridgedEndpoint {
    pub plugin: String,
    pub serial_number: String,
    pub unique_id: String,
    pub device_type: u32,
    pub vendor_id: u16,
    pub vendor_name: String,
    pub product_id: u16,
    pub product_name: String,
    pub device_name: String,
    pub mode: OperationalMode,
    pub children: Vec<BridgedEndpoint>,
    /// Live sensor handle, when this endpoint's cluster is fanned out (§4.6).
    pub sensor: Option<SensorHandle>,
}

impl BridgedEndpoint {
    /// Composite identity `plugin/serial`, used when two plugins happen to
    /// reuse the same serial number.
    pub fn identity(&self) -> String {
        format!("{}/{}", self.plugin, self.serial_number)
    }
}

/// In-memory set of bridged endpoints keyed by identity (§4.3).
pub struct DeviceRegistry {
    endpoints: RwLock<HashMap<String, BridgedEndpoint>>,
    fanout: Mutex<AttributeFanout>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            fanout: Mutex::new(AttributeFanout::new()),
        }
    }

    /// Insert or replace an endpoint. Enforces uniqueness of `serial_number`
    /// within one plugin's own endpoints (§3 invariants) — a replacement
    /// under the same identity is allowed, a *new* endpoint reusing another
    /// plugin's already-registered identity is rejected. When the endpoint
    /// carries a live [`SensorHandle`], starts watching it (§4.6).
    pub fn set(&self, endpoint: BridgedEndpoint, frontend: Arc<dyn Frontend>) -> Result<(), String> {
        let identity = endpoint.identity();
        let sensor = endpoint.sensor.clone();
        let target = sensor.as_ref().map(|_| SubscriptionTarget {
            plugin: endpoint.plugin.clone(),
            serial: endpoint.serial_number.clone(),
            unique_id: endpoint.unique_id.clone(),
            endpoint_number: 0,
            label: endpoint.device_name.clone(),
            cluster: 0,
            attribute: 0,
        });
        {
            let mut endpoints = self.endpoints.write();
            if let Some(existing) = endpoints.get(&identity)
                && existing.plugin != endpoint.plugin
            {
                return Err(format!(
                    "serial `{}` already registered by plugin `{}`",
                    endpoint.serial_number, existing.plugin
                ));
            }
            endpoints.insert(identity, endpoint);
        }
        frontend.refresh_required(RefreshScope::Plugins);

        if let (Some(sensor), Some(mut target)) = (sensor, target) {
            let (cluster, attribute) = sensor.cluster_attribute();
            target.cluster = cluster;
            target.attribute = attribute;
            let mut fanout = self.fanout.lock();
            match sensor {
                SensorHandle::BooleanState(s) | SensorHandle::OccupancySensing(s) => {
                    fanout.watch_bool(s, target, frontend);
                }
                SensorHandle::Temperature(s) => fanout.watch_temperature(s, target, frontend),
                SensorHandle::Humidity(s) => fanout.watch_humidity(s, target, frontend),
            }
        }
        Ok(())
    }

    /// Drop every subscription task, replacing the fan-out with a fresh one
    /// (§4.7 cleanup "stop server nodes in the current mode").
    pub fn reset_fanout(&self) {
        *self.fanout.lock() = AttributeFanout::new();
    }

    pub fn remove(&self, identity: &str, frontend: &dyn Frontend) -> Option<BridgedEndpoint> {
        let removed = self.endpoints.write().remove(identity);
        if removed.is_some() {
            frontend.refresh_required(RefreshScope::Plugins);
        }
        removed
    }

    pub fn get(&self, identity: &str) -> Option<BridgedEndpoint> {
        self.endpoints.read().get(identity).cloned()
    }

    /// Snapshot of all registered endpoints, in no particular order.
    pub fn array(&self) -> Vec<BridgedEndpoint> {
        self.endpoints.read().values().cloned().collect()
    }

    pub fn for_plugin(&self, plugin: &str) -> Vec<BridgedEndpoint> {
        self.endpoints
            .read()
            .values()
            .filter(|e| e.plugin == plugin)
            .cloned()
            .collect()
    }

    pub fn count_for_plugin(&self, plugin: &str) -> usize {
        self.endpoints
            .read()
            .values()
            .filter(|e| e.plugin == plugin)
            .count()
    }

    pub fn clear(&self, frontend: &dyn Frontend) {
        self.endpoints.write().clear();
        frontend.refresh_required(RefreshScope::Plugins);
    }

    /// Drop every endpoint owned by `plugin`. Used by plugin removal and
    /// disable (§4.4 `shutdown(..., removeDevices)`).
    pub fn remove_all_for_plugin(&self, plugin: &str, frontend: &dyn Frontend) -> usize {
        let mut endpoints = self.endpoints.write();
        let before = endpoints.len();
        endpoints.retain(|_, e| e.plugin != plugin);
        let removed = before - endpoints.len();
        drop(endpoints);
        if removed > 0 {
            frontend.refresh_required(RefreshScope::Plugins);
        }
        removed
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::NullFrontend;

    fn sample(plugin: &str, serial: &str) -> BridgedEndpoint {
        BridgedEndpoint {
            plugin: plugin.to_string(),
            serial_number: serial.to_string(),
            unique_id: format!("{plugin}-{serial}-uid"),
            device_type: 0x0100,
            vendor_id: 0xFFF1,
            vendor_name: "test".to_string(),
            product_id: 0x8001,
            product_name: "test".to_string(),
            device_name: "Test Light".to_string(),
            mode: OperationalMode::Bridge,
            children: Vec::new(),
            sensor: None,
        }
    }

    fn frontend() -> Arc<dyn Frontend> {
        Arc::new(NullFrontend)
    }

    #[test]
    fn rejects_cross_plugin_serial_collision() {
        let registry = DeviceRegistry::new();
        registry.set(sample("plugin-a", "b/S1"), frontend()).unwrap();

        // `identity()` joins plugin and serial with `/`, so a plugin named
        // `plugin-a/b` registering serial `S1` produces the exact same
        // identity string as plugin `plugin-a` registering serial `b/S1`,
        // despite being a different plugin. That is the true collision the
        // uniqueness check exists to reject.
        let collide = sample("plugin-a/b", "S1");
        let result = registry.set(collide, frontend());

        assert!(result.is_err());
        assert_eq!(registry.array().len(), 1);
    }

    #[test]
    fn registered_devices_matches_plugin_count() {
        let registry = DeviceRegistry::new();
        registry.set(sample("plugin-a", "S1"), frontend()).unwrap();
        registry.set(sample("plugin-a", "S2"), frontend()).unwrap();
        registry.set(sample("plugin-b", "S1"), frontend()).unwrap();

        assert_eq!(registry.count_for_plugin("plugin-a"), 2);
        assert_eq!(registry.count_for_plugin("plugin-b"), 1);
    }

    #[test]
    fn remove_all_for_plugin_only_touches_that_plugin() {
        let registry = DeviceRegistry::new();
        registry.set(sample("plugin-a", "S1"), frontend()).unwrap();
        registry.set(sample("plugin-b", "S1"), frontend()).unwrap();

        let removed = registry.remove_all_for_plugin("plugin-a", &NullFrontend);
        assert_eq!(removed, 1);
        assert_eq!(registry.array().len(), 1);
        assert_eq!(registry.count_for_plugin("plugin-b"), 1);
    }

    #[tokio::test]
    async fn set_with_sensor_starts_fanout() {
        use crate::matter::endpoints::sensors::helpers::BinarySensorHelper;

        let registry = DeviceRegistry::new();
        let mut endpoint = sample("plugin-a", "S1");
        endpoint.sensor = Some(SensorHandle::BooleanState(Arc::new(BinarySensorHelper::new(false))));
        registry.set(endpoint, frontend()).unwrap();

        assert_eq!(registry.fanout.lock().len(), 1);
    }
}
