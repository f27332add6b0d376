//! Glue between plugin-facing [`EndpointHandler`] objects and the concrete
//! Matter cluster handlers, which are hardcoded to their own state types
//! (`BinarySensorHelper`, `BinarySwitchHelper`) rather than generic over
//! [`Sensor`]. A plugin only ever sees `EndpointHandler`; this module is
//! where that trait object is wired into the state a cluster handler
//! actually owns.

use super::clusters::{BooleanStateHandler, OccupancySensingHandler};
use super::endpoints::handler::EndpointHandler;
use super::endpoints::sensors::helpers::BinarySensorHelper;
use rs_matter::dm::Cluster;
use rs_matter::dm::clusters::decl::on_off as on_off_cluster;
use rs_matter::dm::clusters::on_off::{EffectVariantEnum, OnOffHooks, StartUpOnOffEnum};
use rs_matter::error::Error;
use rs_matter::tlv::Nullable;
use rs_matter::with;
use std::sync::Arc;

/// Matter cluster ID for OnOff (0x0006).
pub const ON_OFF_CLUSTER_ID: u32 = 0x0006;

/// Create the concrete sensor state a [`BooleanStateHandler`] or
/// occupancy-sensing handler is hardcoded against, and wire the plugin's
/// `EndpointHandler` into it so external updates (`set_state_pusher`) land
/// on the sensor and wake any Matter subscription waiting on it.
///
/// Contact and occupancy sensors have no writable attribute, so there is
/// nothing to forward back to the handler's `on_command` — the wiring is
/// one-directional, plugin to Matter.
pub fn bind_binary_sensor(
    handler: &Arc<dyn EndpointHandler>,
    initial: bool,
) -> Arc<BinarySensorHelper> {
    let sensor = Arc::new(BinarySensorHelper::new(initial));
    let sensor_weak = Arc::downgrade(&sensor);
    handler.set_state_pusher(Arc::new(move |value| {
        if let Some(sensor) = sensor_weak.upgrade() {
            sensor.set(value);
        }
    }));
    sensor
}

/// `OnOffHooks` implementation for plugin-contributed bridged endpoints.
///
/// Unlike [`super::endpoints::controls::SwitchHooks`]/`LightSwitch`, which
/// own their state directly, this forwards every call to the plugin's
/// `EndpointHandler` — the plugin is the source of truth for the switch
/// state, not this handler. Backs both `EndpointKind::Switch` and
/// `EndpointKind::LightSwitch`; those two differ only in the endpoint's
/// device type (plug-in unit vs. light), not in the cluster itself.
pub struct PluginOnOffHandler {
    handler: Arc<dyn EndpointHandler>,
}

impl PluginOnOffHandler {
    pub fn new(handler: Arc<dyn EndpointHandler>) -> Self {
        Self { handler }
    }
}

impl OnOffHooks for PluginOnOffHandler {
    const CLUSTER: Cluster<'static> = on_off_cluster::FULL_CLUSTER
        .with_revision(6)
        .with_attrs(with!(required; on_off_cluster::AttributeId::OnOff))
        .with_cmds(with!(
            on_off_cluster::CommandId::Off
                | on_off_cluster::CommandId::On
                | on_off_cluster::CommandId::Toggle
        ));

    fn on_off(&self) -> bool {
        self.handler.get_state()
    }

    fn set_on_off(&self, on: bool) {
        self.handler.on_command(on);
    }

    fn start_up_on_off(&self) -> Nullable<StartUpOnOffEnum> {
        Nullable::none()
    }

    fn set_start_up_on_off(&self, _value: Nullable<StartUpOnOffEnum>) -> Result<(), Error> {
        Ok(())
    }

    async fn handle_off_with_effect(&self, _effect: EffectVariantEnum) {}
}

/// Convenience constructor matching [`BooleanStateHandler::new`]'s
/// signature so callers staging a contact-sensor endpoint don't need to
/// import [`BinarySensorHelper`] directly.
pub fn boolean_state_handler(
    dataver: rs_matter::dm::Dataver,
    handler: &Arc<dyn EndpointHandler>,
    initial: bool,
) -> BooleanStateHandler {
    BooleanStateHandler::new(dataver, bind_binary_sensor(handler, initial))
}

/// Convenience constructor matching [`OccupancySensingHandler::new`]'s
/// signature, analogous to [`boolean_state_handler`].
pub fn occupancy_sensing_handler(
    dataver: rs_matter::dm::Dataver,
    handler: &Arc<dyn EndpointHandler>,
    initial: bool,
) -> OccupancySensingHandler {
    OccupancySensingHandler::new(dataver, bind_binary_sensor(handler, initial))
}
