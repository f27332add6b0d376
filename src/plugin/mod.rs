//! Plugin data model (§3 "Plugin", §4.4).
//!
//! A `Plugin` is the aggregate the manager mutates: its static manifest
//! never changes after registration, its persisted flags and runtime state
//! do. Dynamic Matter handles (`server_node`, `aggregator_node`) are filled
//! in by [`crate::topology`] once the commissioning topology decides where
//! this plugin's endpoints attach.

pub mod manager;

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::matter::server_node::ServerNode;

pub use manager::PluginManager;

/// Plugin archetype (§3, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginKind {
    /// Contributes many bridged endpoints under an aggregator.
    DynamicPlatform,
    /// Exposes exactly one device directly under a server node.
    AccessoryPlatform,
}

/// Static manifest, immutable after registration (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub installed_path: PathBuf,
    pub kind: PluginKind,
}

/// Persisted operational flags (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PersistedFlags {
    pub enabled: bool,
    pub last_error: bool,
}

impl Default for PersistedFlags {
    fn default() -> Self {
        Self {
            enabled: true,
            last_error: false,
        }
    }
}

/// Runtime state, reset on every `enable`/`disable` toggle (§4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeState {
    pub loaded: bool,
    pub started: bool,
    pub configured: bool,
    pub locked: bool,
    pub in_error: bool,
}

/// Dynamic Matter handles, filled in by the commissioning topology once a
/// server node (and, for `DynamicPlatform`, an aggregator) exists for this
/// plugin (§3 "Matter storage context").
#[derive(Default)]
pub struct MatterHandles {
    pub server_node: Option<Arc<ServerNode>>,
    pub aggregator_endpoint_id: Option<u32>,
    /// Set only for `AccessoryPlatform` once its single device is attached.
    pub single_accessory_attached: bool,
}

/// One entry in the plugin roster.
pub struct Plugin {
    pub manifest: Manifest,
    pub flags: RwLock<PersistedFlags>,
    pub runtime: RwLock<RuntimeState>,
    pub matter: RwLock<MatterHandles>,
    pub registered_devices: std::sync::atomic::AtomicUsize,
}

impl Plugin {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            flags: RwLock::new(PersistedFlags::default()),
            runtime: RwLock::new(RuntimeState::default()),
            matter: RwLock::new(MatterHandles::default()),
            registered_devices: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.read().enabled
    }

    pub fn is_in_error(&self) -> bool {
        self.runtime.read().in_error
    }

    pub fn has_started(&self) -> bool {
        self.runtime.read().started
    }

    /// §8 invariant: `enabled = false ⇒ loaded = started = configured = false`.
    pub fn reset_runtime_state(&self) {
        *self.runtime.write() = RuntimeState::default();
    }
}
