//! OnOff hooks for a virtual "switch"/"mounted switch" supervisor-command
//! device (§4.5 "Virtual devices").
//!
//! Turning one of these on invokes the bound supervisor command and the
//! state immediately reverts to off — there is no persistent on/off state
//! to reflect back to a controller, only a momentary trigger.

use super::helpers::BinarySwitchHelper;
use rs_matter::dm::Cluster;
use rs_matter::dm::clusters::decl::on_off as on_off_cluster;
use rs_matter::dm::clusters::on_off::{EffectVariantEnum, OnOffHooks, StartUpOnOffEnum};
use rs_matter::error::Error;
use rs_matter::tlv::Nullable;
use rs_matter::with;
use std::sync::Arc;

/// Virtual-device OnOff switch bound to a supervisor command.
pub struct DeviceSwitch {
    helper: BinarySwitchHelper,
    command: Arc<dyn Fn() + Send + Sync>,
}

impl DeviceSwitch {
    /// `command` runs once per on-transition; the switch reverts to off
    /// immediately afterward.
    pub fn new(command: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            helper: BinarySwitchHelper::new(false),
            command,
        }
    }

    pub fn helper(&self) -> &BinarySwitchHelper {
        &self.helper
    }

    pub fn get(&self) -> bool {
        self.helper.get()
    }
}

impl OnOffHooks for DeviceSwitch {
    const CLUSTER: Cluster<'static> = on_off_cluster::FULL_CLUSTER
        .with_revision(6)
        .with_attrs(with!(required; on_off_cluster::AttributeId::OnOff))
        .with_cmds(with!(
            on_off_cluster::CommandId::Off
                | on_off_cluster::CommandId::On
                | on_off_cluster::CommandId::Toggle
        ));

    fn on_off(&self) -> bool {
        self.helper.get()
    }

    fn set_on_off(&self, on: bool) {
        self.helper.set(on);
        if on {
            (self.command)();
            self.helper.set(false);
        }
    }

    fn start_up_on_off(&self) -> Nullable<StartUpOnOffEnum> {
        Nullable::none()
    }

    fn set_start_up_on_off(&self, _value: Nullable<StartUpOnOffEnum>) -> Result<(), Error> {
        Ok(())
    }

    async fn handle_off_with_effect(&self, _effect: EffectVariantEnum) {}
}
