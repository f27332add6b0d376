//! Dynamic per-endpoint/cluster dispatch (§4.2, §4.5).
//!
//! rs-matter's [`Handler`]/[`NonBlockingHandler`] traits take their context
//! and reply parameters as argument-position `impl Trait`, which makes them
//! non-object-safe — `dyn Handler` does not exist. The teacher's
//! `dm_handler` works around this at compile time by statically chaining one
//! `EpClMatcher` per fixed endpoint/cluster pair. A commissioning topology
//! that attaches a variable number of plugin-contributed endpoints at
//! runtime can't enumerate that chain at compile time, so this module
//! builds the equivalent dispatch table at runtime: one [`EndpointCluster`]
//! entry per `(endpoint_id, cluster_id)`, looked up on every `read`/`write`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rs_matter::dm::clusters::desc::DescHandler;
use rs_matter::dm::clusters::on_off::HandlerAdaptor as OnOffHandlerAdaptor;
use rs_matter::dm::{Handler, NonBlockingHandler, ReadContext, ReadReply, WriteContext};
use rs_matter::error::{Error, ErrorCode};

use super::clusters::{
    BooleanStateHandler, BridgedHandler, GenericSwitchHandler, OccupancySensingHandler,
    RelativeHumidityHandler, TemperatureMeasurementHandler, TimeSyncHandler,
};
use super::endpoints::controls::{DeviceSwitch, LightSwitch, SwitchHooks};
use super::handler_bridge::PluginOnOffHandler;

/// One concrete cluster handler, keyed into the dispatch table. Each
/// variant owns exactly the handler type the corresponding endpoint kind in
/// [`super::virtual_device::EndpointKind`] already builds. The OnOff
/// variants wrap rs-matter's generated `HandlerAdaptor<H>` over each
/// `OnOffHooks` impl, since `SwitchHooks`/`LightSwitch`/`DeviceSwitch`/
/// `PluginOnOffHandler` themselves only implement the hooks trait, not
/// `Handler`. `Switch`/`LightSwitch` back the supervisor's own virtual
/// devices (outlet/light appearance); `PluginOnOff` backs plugin-contributed
/// bridged endpoints of `EndpointKind::Switch`/`EndpointKind::LightSwitch` —
/// same cluster, different device type at staging time.
pub enum EndpointCluster {
    BooleanState(Arc<BooleanStateHandler>),
    OccupancySensing(Arc<OccupancySensingHandler>),
    TemperatureMeasurement(Arc<TemperatureMeasurementHandler>),
    RelativeHumidity(Arc<RelativeHumidityHandler>),
    GenericSwitch(Arc<GenericSwitchHandler>),
    Switch(Arc<OnOffHandlerAdaptor<SwitchHooks>>),
    LightSwitch(Arc<OnOffHandlerAdaptor<LightSwitch>>),
    DeviceSwitch(Arc<OnOffHandlerAdaptor<DeviceSwitch>>),
    PluginOnOff(Arc<OnOffHandlerAdaptor<PluginOnOffHandler>>),
    BridgedDeviceBasicInfo(Arc<BridgedHandler>),
    TimeSync(Arc<TimeSyncHandler>),
    /// Descriptor cluster, one per endpoint (every endpoint carries it).
    Descriptor(Arc<DescHandler>),
}

/// Runtime-mutable dispatch table for one server node's data model.
///
/// Endpoints are only ever added while the node is not yet started
/// (rs-matter, like the Matter spec itself, requires a node restart to
/// change its endpoint composition) — see [`super::server_node::ServerNode`].
#[derive(Default)]
pub struct DynamicBridgeHandler {
    table: RwLock<HashMap<(u16, u32), EndpointCluster>>,
}

impl DynamicBridgeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, endpoint_id: u16, cluster_id: u32, cluster: EndpointCluster) {
        self.table.write().insert((endpoint_id, cluster_id), cluster);
    }

    pub fn remove_endpoint(&self, endpoint_id: u16) {
        self.table.write().retain(|(ep, _), _| *ep != endpoint_id);
    }

    pub fn has_attribute_server(&self, endpoint_id: u16, cluster_id: u32) -> bool {
        self.table.read().contains_key(&(endpoint_id, cluster_id))
    }
}

impl Handler for DynamicBridgeHandler {
    fn read(&self, ctx: impl ReadContext, reply: impl ReadReply) -> Result<(), Error> {
        let attr = ctx.attr();
        let key = (attr.endpoint_id, attr.cluster_id);
        let table = self.table.read();
        match table.get(&key) {
            Some(EndpointCluster::BooleanState(h)) => h.read(ctx, reply),
            Some(EndpointCluster::OccupancySensing(h)) => h.read(ctx, reply),
            Some(EndpointCluster::TemperatureMeasurement(h)) => h.read(ctx, reply),
            Some(EndpointCluster::RelativeHumidity(h)) => h.read(ctx, reply),
            Some(EndpointCluster::GenericSwitch(h)) => h.read(ctx, reply),
            Some(EndpointCluster::BridgedDeviceBasicInfo(h)) => h.read(ctx, reply),
            Some(EndpointCluster::TimeSync(h)) => h.read(ctx, reply),
            Some(EndpointCluster::Switch(h)) => h.read(ctx, reply),
            Some(EndpointCluster::LightSwitch(h)) => h.read(ctx, reply),
            Some(EndpointCluster::DeviceSwitch(h)) => h.read(ctx, reply),
            Some(EndpointCluster::PluginOnOff(h)) => h.read(ctx, reply),
            Some(EndpointCluster::Descriptor(h)) => h.read(ctx, reply),
            None => Err(ErrorCode::EndpointNotFound.into()),
        }
    }

    fn write(&self, ctx: impl WriteContext) -> Result<(), Error> {
        let attr = ctx.attr();
        let key = (attr.endpoint_id, attr.cluster_id);
        let table = self.table.read();
        match table.get(&key) {
            Some(EndpointCluster::BooleanState(h)) => h.write(ctx),
            Some(EndpointCluster::OccupancySensing(h)) => h.write(ctx),
            Some(EndpointCluster::TemperatureMeasurement(h)) => h.write(ctx),
            Some(EndpointCluster::RelativeHumidity(h)) => h.write(ctx),
            Some(EndpointCluster::GenericSwitch(h)) => h.write(ctx),
            Some(EndpointCluster::BridgedDeviceBasicInfo(h)) => h.write(ctx),
            Some(EndpointCluster::TimeSync(h)) => h.write(ctx),
            Some(EndpointCluster::Switch(h)) => h.write(ctx),
            Some(EndpointCluster::LightSwitch(h)) => h.write(ctx),
            Some(EndpointCluster::DeviceSwitch(h)) => h.write(ctx),
            Some(EndpointCluster::PluginOnOff(h)) => h.write(ctx),
            Some(EndpointCluster::Descriptor(h)) => h.write(ctx),
            None => Err(ErrorCode::EndpointNotFound.into()),
        }
    }
}

impl NonBlockingHandler for DynamicBridgeHandler {}
