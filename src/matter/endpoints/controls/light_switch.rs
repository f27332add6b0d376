//! OnOff hooks for a virtual "light" supervisor-command device (§4.5
//! "Virtual devices").
//!
//! Turning this on invokes the bound supervisor command and the state
//! immediately reverts to off — there is no persistent on/off state to
//! reflect back to a controller, only a momentary trigger. Uses the
//! On/Off Light device type (0x0100) so it appears as a light in
//! controllers.

use super::helpers::BinarySwitchHelper;
use rs_matter::dm::Cluster;
use rs_matter::dm::clusters::decl::on_off as on_off_cluster;
use rs_matter::dm::clusters::on_off::{EffectVariantEnum, OnOffHooks, StartUpOnOffEnum};
use rs_matter::error::Error;
use rs_matter::tlv::Nullable;
use rs_matter::with;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Virtual-device OnOff light bound to a supervisor command.
pub struct LightSwitch {
    helper: BinarySwitchHelper,
    /// Startup behavior configuration (encoded as Option discriminant + value)
    /// 0 = None, 1 = Off, 2 = On, 3 = Toggle
    start_up_on_off: AtomicU8,
    command: Arc<dyn Fn() + Send + Sync>,
}

impl LightSwitch {
    /// `command` runs once per on-transition; the light reverts to off
    /// immediately afterward.
    pub fn new(command: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            helper: BinarySwitchHelper::new(false),
            start_up_on_off: AtomicU8::new(0), // None
            command,
        }
    }

    /// Get the underlying helper for external state access.
    pub fn helper(&self) -> &BinarySwitchHelper {
        &self.helper
    }

    /// Get the current light state.
    pub fn get(&self) -> bool {
        self.helper.get()
    }

    /// Encode StartUpOnOffEnum to u8
    fn encode_start_up(value: Option<StartUpOnOffEnum>) -> u8 {
        match value {
            None => 0,
            Some(StartUpOnOffEnum::Off) => 1,
            Some(StartUpOnOffEnum::On) => 2,
            Some(StartUpOnOffEnum::Toggle) => 3,
        }
    }

    /// Decode u8 to Option<StartUpOnOffEnum>
    fn decode_start_up(value: u8) -> Option<StartUpOnOffEnum> {
        match value {
            0 => None,
            1 => Some(StartUpOnOffEnum::Off),
            2 => Some(StartUpOnOffEnum::On),
            3 => Some(StartUpOnOffEnum::Toggle),
            _ => None, // Invalid value, treat as None
        }
    }
}

impl OnOffHooks for LightSwitch {
    /// Cluster definition with basic OnOff functionality.
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
        match Self::decode_start_up(self.start_up_on_off.load(Ordering::SeqCst)) {
            Some(value) => Nullable::some(value),
            None => Nullable::none(),
        }
    }

    fn set_start_up_on_off(&self, value: Nullable<StartUpOnOffEnum>) -> Result<(), Error> {
        self.start_up_on_off
            .store(Self::encode_start_up(value.into_option()), Ordering::SeqCst);
        Ok(())
    }

    async fn handle_off_with_effect(&self, _effect: EffectVariantEnum) {}
}
