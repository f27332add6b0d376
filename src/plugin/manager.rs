//! Plugin manager (§4.4).
//!
//! In a statically-linked target "loading a plugin" means resolving its
//! name against a compile-time registry of [`PluginRuntime`] constructors
//! rather than `require()`-ing an installed package (§9 "Dynamic plugin
//! loading"). The manifest-parse/reinstall recovery loop therefore
//! degenerates to a registry lookup: a name the registry doesn't know is
//! `PluginError::ManifestMissing`, and there is no reinstall to attempt.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use parking_lot::RwLock;

use crate::error::PluginError;
use crate::frontend::{Frontend, Severity};
use crate::plugin::{Manifest, Plugin, PluginKind};
use crate::registry::DeviceRegistry;
use crate::store::KvStore;

/// The three-valued result `configure(plugin)` returns (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Success,
    SilentFailure,
    Exception,
}

/// The behavior a compiled-in plugin implements. Real plugins are out of
/// scope (§1 Non-goals: "Shipping specific plugins"); this is the seam the
/// manager drives and the contract any compiled-in plugin must satisfy.
pub trait PluginRuntime: Send + Sync {
    fn on_start(&self, reason: &str) -> Result<(), String>;
    fn on_configure(&self) -> ConfigureOutcome;
    fn on_shutdown(&self, reason: &str);
}

type RuntimeFactory = Box<dyn Fn() -> Box<dyn PluginRuntime> + Send + Sync>;

/// Default fail-safe tick limit (§4.4): 120 ticks of a 1s poll = 2 minutes.
pub const DEFAULT_FAIL_COUNT_LIMIT: u32 = 120;
/// Embedded-board profile limit (§4.4).
pub const EMBEDDED_FAIL_COUNT_LIMIT: u32 = 600;

pub struct PluginManager {
    roster: RwLock<Vec<Arc<Plugin>>>,
    registry_table: RwLock<HashMap<String, RuntimeFactory>>,
    instances: RwLock<HashMap<String, Box<dyn PluginRuntime>>>,
    store: Arc<KvStore>,
}

impl PluginManager {
    pub fn new(store: Arc<KvStore>) -> Self {
        Self {
            roster: RwLock::new(Vec::new()),
            registry_table: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Register a compile-time-known plugin implementation under `name`,
    /// standing in for the ecosystem package manager discovery this was
    /// distilled from.
    pub fn register_runtime(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn PluginRuntime> + Send + Sync + 'static,
    ) {
        self.registry_table.write().insert(name.into(), Box::new(factory));
    }

    pub fn roster(&self) -> Vec<Arc<Plugin>> {
        self.roster.read().clone()
    }

    pub fn find(&self, name: &str) -> Option<Arc<Plugin>> {
        self.roster.read().iter().find(|p| p.name() == name).cloned()
    }

    /// `add(ref)` (§4.4): resolve to a manifest, reject if already
    /// registered, append with `enabled = true`.
    pub fn add(&self, reference: &str, kind: PluginKind, version: &str, description: &str, author: &str) -> Result<Arc<Plugin>, PluginError> {
        if self.find(reference).is_some() {
            return Err(PluginError::AlreadyRegistered(reference.to_string()));
        }
        if !self.registry_table.read().contains_key(reference) {
            return Err(PluginError::ManifestMissing(reference.to_string()));
        }

        let manifest = Manifest {
            name: reference.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            author: author.to_string(),
            installed_path: Path::new(reference).to_path_buf(),
            kind,
        };
        let plugin = Arc::new(Plugin::new(manifest));
        self.roster.write().push(plugin.clone());
        info!("registered plugin `{reference}`");
        Ok(plugin)
    }

    /// `remove(name)` (§4.4): shut down, optionally clear Matter namespace,
    /// drop from roster.
    pub fn remove(
        &self,
        name: &str,
        clear_matter_namespace: bool,
        registry: &DeviceRegistry,
        frontend: &dyn Frontend,
    ) -> Result<(), PluginError> {
        let plugin = self.find(name).ok_or_else(|| PluginError::NotRegistered(name.to_string()))?;
        self.shutdown(&plugin, "removing", true, registry, frontend);

        if clear_matter_namespace {
            for sub in self.store.list_sub_storages() {
                if sub == name {
                    if let Ok(s) = self.store.sub_storage(&sub) {
                        let _ = s.clear_all();
                    }
                }
            }
        }

        self.roster.write().retain(|p| p.name() != name);
        self.instances.write().remove(name);
        Ok(())
    }

    pub fn enable(&self, name: &str) -> Result<(), PluginError> {
        let plugin = self.find(name).ok_or_else(|| PluginError::NotRegistered(name.to_string()))?;
        plugin.flags.write().enabled = true;
        plugin.reset_runtime_state();
        Ok(())
    }

    /// `disable(name)` (§4.4): toggle flag, reset runtime state. §8
    /// invariant: `enabled = false ⇒ loaded = started = configured = false`.
    pub fn disable(&self, name: &str) -> Result<(), PluginError> {
        let plugin = self.find(name).ok_or_else(|| PluginError::NotRegistered(name.to_string()))?;
        plugin.flags.write().enabled = false;
        plugin.reset_runtime_state();
        Ok(())
    }

    /// `parse(plugin)` (§4.4): validate the manifest, `None` on malformed
    /// input (triggers the §4.7 recovery path at the call site).
    pub fn parse(&self, plugin: &Plugin) -> Option<()> {
        if plugin.manifest.name.is_empty() {
            return None;
        }
        Some(())
    }

    /// `load(plugin, start, reason)` (§4.4): initialize the runtime
    /// instance; invoke `on_start` if `start` and loading succeeded. Errors
    /// set `in_error = true` and are swallowed — they must never crash the
    /// supervisor.
    pub fn load(&self, plugin: &Arc<Plugin>, start: bool, reason: &str) {
        let factory = {
            let table = self.registry_table.read();
            table.get(plugin.name()).map(|_| ())
        };
        if factory.is_none() {
            warn!("plugin `{}` has no registered runtime; marking in_error", plugin.name());
            plugin.runtime.write().in_error = true;
            return;
        }

        let instance = {
            let table = self.registry_table.read();
            (table[plugin.name()])()
        };
        plugin.runtime.write().loaded = true;
        self.instances.write().insert(plugin.name().to_string(), instance);

        if start {
            self.start(plugin, reason);
        }
    }

    fn start(&self, plugin: &Arc<Plugin>, reason: &str) {
        let instances = self.instances.read();
        let Some(instance) = instances.get(plugin.name()) else {
            plugin.runtime.write().in_error = true;
            return;
        };
        match instance.on_start(reason) {
            Ok(()) => {
                plugin.runtime.write().started = true;
            }
            Err(e) => {
                error!("plugin `{}` failed to start: {e}", plugin.name());
                plugin.runtime.write().in_error = true;
            }
        }
    }

    /// `configure(plugin)` (§4.4): three-valued outcome; silent failure
    /// surfaces a user snackbar.
    pub fn configure(&self, plugin: &Arc<Plugin>, frontend: &dyn Frontend) -> ConfigureOutcome {
        let instances = self.instances.read();
        let Some(instance) = instances.get(plugin.name()) else {
            return ConfigureOutcome::Exception;
        };
        let outcome = instance.on_configure();
        match outcome {
            ConfigureOutcome::Success => {
                plugin.runtime.write().configured = true;
            }
            ConfigureOutcome::SilentFailure => {
                frontend.snackbar_message(
                    &format!("plugin {} failed to configure", plugin.name()),
                    5,
                    Severity::Warning,
                );
            }
            ConfigureOutcome::Exception => {
                plugin.runtime.write().in_error = true;
            }
        }
        outcome
    }

    /// `shutdown(plugin, reason, removeDevices?)` (§4.4).
    pub fn shutdown(
        &self,
        plugin: &Arc<Plugin>,
        reason: &str,
        remove_devices: bool,
        registry: &DeviceRegistry,
        frontend: &dyn Frontend,
    ) {
        if let Some(instance) = self.instances.read().get(plugin.name()) {
            instance.on_shutdown(reason);
        }
        plugin.reset_runtime_state();
        if remove_devices {
            std::thread::sleep(Duration::from_millis(100));
            registry.remove_all_for_plugin(plugin.name(), frontend);
        }
    }

    /// Fail-safe counter (§4.4): declare `plugin` in error once it has not
    /// progressed loaded→started within `limit` ticks of the 1s poll.
    pub fn check_fail_safe(plugin: &Plugin, ticks_waited: u32, limit: u32) -> bool {
        let runtime = plugin.runtime.read();
        if runtime.started || runtime.in_error {
            return runtime.in_error;
        }
        drop(runtime);
        if ticks_waited >= limit {
            warn!(
                "plugin `{}` did not start within {limit} ticks; declaring in_error",
                plugin.name()
            );
            plugin.runtime.write().in_error = true;
            true
        } else {
            false
        }
    }

    /// Pre-flight (§4.5 "Build ordering"): reject any non-`DynamicPlatform`
    /// plugin that registered zero devices.
    pub fn preflight_zero_device_check(&self, registry: &DeviceRegistry) -> Vec<String> {
        self.roster()
            .into_iter()
            .filter(|p| p.is_enabled() && !p.is_in_error())
            .filter(|p| p.manifest.kind != PluginKind::DynamicPlatform)
            .filter(|p| registry.count_for_plugin(p.name()) == 0)
            .map(|p| p.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::NullFrontend;
    use std::sync::Mutex;

    struct FakeRuntime {
        start_result: Result<(), String>,
        configure_result: ConfigureOutcome,
        shutdown_calls: Arc<Mutex<Vec<String>>>,
    }

    impl PluginRuntime for FakeRuntime {
        fn on_start(&self, _reason: &str) -> Result<(), String> {
            self.start_result.clone()
        }
        fn on_configure(&self) -> ConfigureOutcome {
            self.configure_result
        }
        fn on_shutdown(&self, reason: &str) {
            self.shutdown_calls.lock().unwrap().push(reason.to_string());
        }
    }

    fn temp_store() -> Arc<KvStore> {
        let dir = std::env::temp_dir().join(format!(
            "matterbridge-supervisor-plugin-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        Arc::new(KvStore::open(&dir.join("storage"), &dir.join("storage.backup"), false).unwrap())
    }

    #[test]
    fn disable_resets_runtime_state() {
        let manager = PluginManager::new(temp_store());
        manager.register_runtime("demo", || {
            Box::new(FakeRuntime {
                start_result: Ok(()),
                configure_result: ConfigureOutcome::Success,
                shutdown_calls: Arc::new(Mutex::new(Vec::new())),
            })
        });
        let plugin = manager.add("demo", PluginKind::DynamicPlatform, "1.0.0", "d", "a").unwrap();
        manager.load(&plugin, true, "initial start");
        assert!(plugin.has_started());

        manager.disable("demo").unwrap();
        assert!(!plugin.has_started());
        assert!(!plugin.is_enabled());
    }

    #[test]
    fn load_without_registered_runtime_marks_in_error() {
        let manager = PluginManager::new(temp_store());
        let plugin = manager.add_unregistered_for_test();
        manager.load(&plugin, true, "start");
        assert!(plugin.is_in_error());
    }

    impl PluginManager {
        fn add_unregistered_for_test(&self) -> Arc<Plugin> {
            let manifest = Manifest {
                name: "ghost".to_string(),
                version: "0.0.0".to_string(),
                description: String::new(),
                author: String::new(),
                installed_path: Path::new("ghost").to_path_buf(),
                kind: PluginKind::DynamicPlatform,
            };
            let plugin = Arc::new(Plugin::new(manifest));
            self.roster.write().push(plugin.clone());
            plugin
        }
    }

    #[test]
    fn fail_safe_counter_trips_after_limit() {
        let manager = PluginManager::new(temp_store());
        manager.register_runtime("slow", || {
            Box::new(FakeRuntime {
                start_result: Ok(()),
                configure_result: ConfigureOutcome::Success,
                shutdown_calls: Arc::new(Mutex::new(Vec::new())),
            })
        });
        let plugin = manager.add("slow", PluginKind::DynamicPlatform, "1.0.0", "d", "a").unwrap();
        manager.load(&plugin, false, "start");

        assert!(!PluginManager::check_fail_safe(&plugin, 10, DEFAULT_FAIL_COUNT_LIMIT));
        assert!(PluginManager::check_fail_safe(&plugin, DEFAULT_FAIL_COUNT_LIMIT, DEFAULT_FAIL_COUNT_LIMIT));
        assert!(plugin.is_in_error());
    }

    #[test]
    fn configure_silent_failure_surfaces_snackbar_not_error() {
        let manager = PluginManager::new(temp_store());
        manager.register_runtime("flaky", || {
            Box::new(FakeRuntime {
                start_result: Ok(()),
                configure_result: ConfigureOutcome::SilentFailure,
                shutdown_calls: Arc::new(Mutex::new(Vec::new())),
            })
        });
        let plugin = manager.add("flaky", PluginKind::DynamicPlatform, "1.0.0", "d", "a").unwrap();
        manager.load(&plugin, false, "start");
        let outcome = manager.configure(&plugin, &NullFrontend);
        assert_eq!(outcome, ConfigureOutcome::SilentFailure);
        assert!(!plugin.is_in_error());
    }
}
