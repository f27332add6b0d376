//! Commissioning topology (§4.5): bridge vs. childbridge vs. controller
//! mode, seed allocation for the server node(s) each mode needs, the
//! virtual-device appearance a node's own supervisor commands take, and the
//! 15-minute advertising window used to answer "is this node still
//! discoverable" queries from the frontend.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rand::Rng;
use rs_matter::dm::clusters::on_off::{HandlerAdaptor as OnOffHandlerAdaptor, OnOffHooks};
use rs_matter::dm::{Cluster, Dataver, DeviceType};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::store::SubStorage;

use crate::matter::clusters::{
    BooleanStateHandler, BridgedDeviceInfo, BridgedHandler, GenericSwitchHandler,
    OccupancySensingHandler, RelativeHumidityHandler, TemperatureMeasurementHandler,
    boolean_state, bridged_device_basic_info, generic_switch, occupancy_sensing,
    relative_humidity, temperature_measurement,
};
use crate::matter::device_types::{
    DEV_TYPE_BRIDGED_NODE, DEV_TYPE_CONTACT_SENSOR, DEV_TYPE_GENERIC_SWITCH,
    DEV_TYPE_HUMIDITY_SENSOR, DEV_TYPE_OCCUPANCY_SENSOR, DEV_TYPE_ON_OFF_LIGHT,
    DEV_TYPE_ON_OFF_PLUG_IN_UNIT, DEV_TYPE_TEMPERATURE_SENSOR,
};
use crate::matter::dynamic_handler::EndpointCluster;
use crate::matter::endpoints::controls::{DeviceSwitch, LightSwitch, SwitchHooks};
use crate::matter::handler_bridge::{ON_OFF_CLUSTER_ID, PluginOnOffHandler, bind_binary_sensor};
use crate::matter::server_node::{NodeSeeds, ServerNode};
use crate::matter::virtual_device::{EndpointConfig, EndpointKind, VirtualDevice};

/// How a node's server node(s) are organized (§4.5 "Commissioning topology").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeMode {
    /// One server node, one shared aggregator; every plugin's bridged
    /// endpoints attach under it.
    Bridge,
    /// One server node (and its own aggregator) per `DynamicPlatform`
    /// plugin; `AccessoryPlatform` plugins get a single non-bridged
    /// endpoint on their own server node instead.
    Childbridge,
    /// Reserved for a future Matter controller role. Not implemented —
    /// selecting it is accepted by the CLI/config but the supervisor
    /// refuses to start.
    Controller,
    /// Loads and starts every enabled plugin without standing up any
    /// Matter server node — a dry run for exercising plugin lifecycle
    /// wiring against the registry.
    Test,
}

/// Whether the supervisor's own commands (restart/update/unregister) are
/// also exposed as a Matter device, and which appearance they take (§4.5
/// "Virtual devices").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualMode {
    Disabled,
    Outlet,
    Light,
    Switch,
    MountedSwitch,
}

fn new_dataver() -> Dataver {
    Dataver::new_rand(rs_matter::utils::rand::sys_rand)
}

/// Resolves and persists the `(port, passcode, discriminator)` triplet each
/// server node commissions with.
///
/// Precedence (§4.5 "seed allocation") is CLI flags, then the pairing
/// file, then the persisted store, then a freshly generated value. The
/// first two only ever apply to the single primary node and are resolved
/// earlier by [`crate::config::NodeConfig::merge_cli`] and
/// `apply_pairing_seeds` — [`SeedAllocator::primary`] just packages that
/// already-resolved triplet. Childbridge mode's per-plugin secondary nodes
/// have no CLI/pairing input, so [`SeedAllocator::allocate_for`] only ever
/// chooses between "already on disk" and "generate and persist".
pub struct SeedAllocator {
    store: Arc<SubStorage>,
    next_port: AtomicU16,
}

impl SeedAllocator {
    pub fn new(store: Arc<SubStorage>, base_port: u16) -> Self {
        Self {
            store,
            next_port: AtomicU16::new(base_port.wrapping_add(1)),
        }
    }

    /// Seeds for the single shared node in bridge mode.
    pub fn primary(port: u16, passcode: u32, discriminator: u16) -> NodeSeeds {
        NodeSeeds { port, passcode, discriminator }
    }

    /// Seeds for one plugin's own server node in childbridge mode.
    pub fn allocate_for(&self, plugin_name: &str) -> Result<NodeSeeds, StorageError> {
        let storage_key = format!("seeds.{plugin_name}");
        if let Some(seeds) = self.store.get_opt::<NodeSeeds>(&storage_key)? {
            return Ok(seeds);
        }

        let mut rng = rand::thread_rng();
        let seeds = NodeSeeds {
            port: self.next_port.fetch_add(1, Ordering::SeqCst),
            passcode: rng.gen_range(1..=99_999_998),
            discriminator: rng.gen_range(0..4096),
        };
        self.store.set(&storage_key, &seeds)?;
        Ok(seeds)
    }

    /// Drop a plugin's persisted seeds, e.g. after it's uninstalled — the
    /// next `allocate_for` call for that key starts fresh.
    pub fn forget(&self, plugin_name: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("seeds.{plugin_name}"))
    }
}

/// 15-minute post-open-comm-window bookkeeping (§4.5 "advertising
/// tracking"). rs-matter's own comm-window timer runs independently inside
/// the Matter stack thread and closes the window server-side; this tracker
/// only answers the frontend's "is this node still advertising" query
/// without reaching into that thread.
pub struct AdvertisingTracker {
    opened: RwLock<HashMap<u16, Instant>>,
}

impl AdvertisingTracker {
    pub const WINDOW: Duration = Duration::from_secs(15 * 60);

    pub fn new() -> Self {
        Self { opened: RwLock::new(HashMap::new()) }
    }

    pub fn mark_opened(&self, node_id: u16) {
        self.opened.write().insert(node_id, Instant::now());
    }

    pub fn is_advertising(&self, node_id: u16) -> bool {
        match self.opened.read().get(&node_id) {
            Some(opened_at) => opened_at.elapsed() < Self::WINDOW,
            None => false,
        }
    }

    pub fn clear(&self, node_id: u16) {
        self.opened.write().remove(&node_id);
    }
}

impl Default for AdvertisingTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// The functional device type plus the generic "bridged node" type every
/// child of an aggregator carries alongside it.
fn device_types_for(kind: EndpointKind) -> Vec<DeviceType> {
    let functional = match kind {
        EndpointKind::ContactSensor => DEV_TYPE_CONTACT_SENSOR,
        EndpointKind::OccupancySensor => DEV_TYPE_OCCUPANCY_SENSOR,
        EndpointKind::Switch => DEV_TYPE_ON_OFF_PLUG_IN_UNIT,
        EndpointKind::LightSwitch => DEV_TYPE_ON_OFF_LIGHT,
        EndpointKind::TemperatureSensor => DEV_TYPE_TEMPERATURE_SENSOR,
        EndpointKind::HumiditySensor => DEV_TYPE_HUMIDITY_SENSOR,
        EndpointKind::GenericSwitch => DEV_TYPE_GENERIC_SWITCH,
    };
    vec![functional, DEV_TYPE_BRIDGED_NODE]
}

fn bridged_device_basic_info_cluster(
    label: &'static str,
    shared_info: Option<&BridgedDeviceInfo>,
) -> (u32, Cluster<'static>, EndpointCluster) {
    let mut info = shared_info.cloned().unwrap_or_else(|| BridgedDeviceInfo::new(label));
    info.node_label = label;
    let handler = Arc::new(BridgedHandler::new_always_reachable(new_dataver(), info));
    (
        bridged_device_basic_info::CLUSTER_ID,
        BridgedHandler::CLUSTER,
        EndpointCluster::BridgedDeviceBasicInfo(handler),
    )
}

fn functional_cluster(cfg: &EndpointConfig, endpoint_id: u16) -> (u32, Cluster<'static>, EndpointCluster) {
    match cfg.kind {
        EndpointKind::ContactSensor => {
            let sensor = bind_binary_sensor(&cfg.handler, false);
            (
                boolean_state::CLUSTER_ID,
                BooleanStateHandler::CLUSTER,
                EndpointCluster::BooleanState(Arc::new(BooleanStateHandler::new(new_dataver(), sensor))),
            )
        }
        EndpointKind::OccupancySensor => {
            let sensor = bind_binary_sensor(&cfg.handler, false);
            (
                occupancy_sensing::CLUSTER_ID,
                OccupancySensingHandler::CLUSTER,
                EndpointCluster::OccupancySensing(Arc::new(OccupancySensingHandler::new(new_dataver(), sensor))),
            )
        }
        EndpointKind::Switch | EndpointKind::LightSwitch => {
            let hooks = PluginOnOffHandler::new(cfg.handler.clone());
            (
                ON_OFF_CLUSTER_ID,
                <PluginOnOffHandler as OnOffHooks>::CLUSTER,
                EndpointCluster::PluginOnOff(Arc::new(OnOffHandlerAdaptor::new(new_dataver(), hooks))),
            )
        }
        EndpointKind::TemperatureSensor => {
            let sensor = cfg
                .temperature_sensor
                .clone()
                .expect("EndpointKind::TemperatureSensor staged without a temperature_sensor state");
            (
                temperature_measurement::CLUSTER_ID,
                TemperatureMeasurementHandler::CLUSTER,
                EndpointCluster::TemperatureMeasurement(Arc::new(TemperatureMeasurementHandler::new(
                    new_dataver(),
                    sensor,
                ))),
            )
        }
        EndpointKind::HumiditySensor => {
            let sensor = cfg
                .humidity_sensor
                .clone()
                .expect("EndpointKind::HumiditySensor staged without a humidity_sensor state");
            (
                relative_humidity::CLUSTER_ID,
                RelativeHumidityHandler::CLUSTER,
                EndpointCluster::RelativeHumidity(Arc::new(RelativeHumidityHandler::new(new_dataver(), sensor))),
            )
        }
        EndpointKind::GenericSwitch => {
            let state = cfg
                .generic_switch_state
                .clone()
                .expect("EndpointKind::GenericSwitch staged without a generic_switch_state");
            state.set_endpoint_id(endpoint_id);
            (
                generic_switch::CLUSTER_ID,
                GenericSwitchHandler::CLUSTER,
                EndpointCluster::GenericSwitch(Arc::new(GenericSwitchHandler::new(new_dataver(), state))),
            )
        }
    }
}

/// Stage one bridged endpoint's clusters onto `server_node` (the
/// Descriptor cluster is added automatically by
/// [`ServerNode::start`](super::server_node::ServerNode::start)) and
/// return its allocated endpoint id.
fn attach_endpoint(
    server_node: &Arc<ServerNode>,
    cfg: &EndpointConfig,
    shared_info: Option<&BridgedDeviceInfo>,
) -> u16 {
    let id = server_node.alloc_endpoint_id();
    let clusters = vec![functional_cluster(cfg, id), bridged_device_basic_info_cluster(cfg.label, shared_info)];
    server_node.stage_endpoint(id, device_types_for(cfg.kind), clusters);
    id
}

/// Stage every endpoint of a virtual device onto a server node's
/// aggregator and return the endpoint ids assigned, in the same order as
/// `device.endpoints`.
pub fn attach_virtual_device(server_node: &Arc<ServerNode>, device: &VirtualDevice) -> Vec<u16> {
    device
        .endpoints
        .iter()
        .map(|cfg| attach_endpoint(server_node, cfg, device.device_info.as_ref()))
        .collect()
}

/// One supervisor command exposed as a virtual device (§4.5 "Virtual
/// devices") — e.g. `("Restart", restart_fn)`.
pub type VirtualCommand = (&'static str, Arc<dyn Fn() + Send + Sync>);

/// Stage `commands` as virtual devices of `mode`'s appearance onto the
/// aggregator of `server_node`. Only valid in `bridge` mode and in
/// `childbridge+DynamicPlatform` — the caller decides whether that applies
/// and skips the call (or passes `VirtualMode::Disabled`) otherwise.
pub fn attach_virtual_commands(
    server_node: &Arc<ServerNode>,
    mode: VirtualMode,
    commands: &[VirtualCommand],
) -> Vec<u16> {
    if mode == VirtualMode::Disabled {
        return Vec::new();
    }

    commands
        .iter()
        .map(|(label, command)| attach_virtual_command(server_node, mode, label, command.clone()))
        .collect()
}

fn attach_virtual_command(
    server_node: &Arc<ServerNode>,
    mode: VirtualMode,
    label: &'static str,
    command: Arc<dyn Fn() + Send + Sync>,
) -> u16 {
    let id = server_node.alloc_endpoint_id();
    let (device_type, cluster) = match mode {
        VirtualMode::Disabled => unreachable!("caller filters out VirtualMode::Disabled"),
        VirtualMode::Outlet => (
            DEV_TYPE_ON_OFF_PLUG_IN_UNIT,
            (
                ON_OFF_CLUSTER_ID,
                <SwitchHooks as OnOffHooks>::CLUSTER,
                EndpointCluster::Switch(Arc::new(OnOffHandlerAdaptor::new(new_dataver(), SwitchHooks::new(command)))),
            ),
        ),
        VirtualMode::Light => (
            DEV_TYPE_ON_OFF_LIGHT,
            (
                ON_OFF_CLUSTER_ID,
                <LightSwitch as OnOffHooks>::CLUSTER,
                EndpointCluster::LightSwitch(Arc::new(OnOffHandlerAdaptor::new(
                    new_dataver(),
                    LightSwitch::new(command),
                ))),
            ),
        ),
        VirtualMode::Switch | VirtualMode::MountedSwitch => (
            DEV_TYPE_ON_OFF_PLUG_IN_UNIT,
            (
                ON_OFF_CLUSTER_ID,
                <DeviceSwitch as OnOffHooks>::CLUSTER,
                EndpointCluster::DeviceSwitch(Arc::new(OnOffHandlerAdaptor::new(
                    new_dataver(),
                    DeviceSwitch::new(command),
                ))),
            ),
        ),
    };
    let clusters = vec![cluster, bridged_device_basic_info_cluster(label, None)];
    server_node.stage_endpoint(id, vec![device_type, DEV_TYPE_BRIDGED_NODE], clusters);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> Arc<SubStorage> {
        let dir = std::env::temp_dir().join(format!(
            "topology-test-{}-{:p}",
            std::process::id(),
            &0u8 as *const u8
        ));
        let backup = std::env::temp_dir().join(format!(
            "topology-test-{}-{:p}.backup",
            std::process::id(),
            &0u8 as *const u8
        ));
        let store = crate::store::KvStore::open(&dir, &backup, true).expect("open store");
        Arc::new(store.sub_storage("seeds").expect("open sub-storage"))
    }

    #[test]
    fn allocate_for_persists_and_is_stable_across_calls() {
        let store = temp_store();
        let allocator = SeedAllocator::new(store, 5540);
        let first = allocator.allocate_for("plugin-a").expect("allocate");
        let second = allocator.allocate_for("plugin-a").expect("allocate again");
        assert_eq!(first.port, second.port);
        assert_eq!(first.passcode, second.passcode);
        assert_eq!(first.discriminator, second.discriminator);
    }

    #[test]
    fn allocate_for_gives_distinct_ports_per_plugin() {
        let store = temp_store();
        let allocator = SeedAllocator::new(store, 5540);
        let a = allocator.allocate_for("plugin-a").expect("allocate a");
        let b = allocator.allocate_for("plugin-b").expect("allocate b");
        assert_ne!(a.port, b.port);
    }

    #[test]
    fn advertising_tracker_reports_false_before_any_window_is_opened() {
        let tracker = AdvertisingTracker::new();
        assert!(!tracker.is_advertising(1));
        tracker.mark_opened(1);
        assert!(tracker.is_advertising(1));
        tracker.clear(1);
        assert!(!tracker.is_advertising(1));
    }
}
