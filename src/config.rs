//! Supervisor configuration (§6 "Persisted keys", §4.7 initialization).
//!
//! `NodeConfig` is the merged view of three sources, applied in the order
//! the spec prescribes for seed resolution and carried through for every
//! other setting too: CLI flags override the persisted store, which
//! overrides the built-in defaults. The pairing file (§4.8) is applied
//! separately, after this merge, since it only overrides identity/seed
//! fields and never the operator-visible settings below.

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::StorageError;
use crate::store::SubStorage;
use crate::topology::{BridgeMode, VirtualMode};

/// Load environment variables from `.env` with permissive quoting, same
/// convention `load_dotenv` always used in this codebase. Env vars already
/// set take precedence over the file.
pub fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match std::fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = &value[1..value.len() - 1];
            }
            if std::env::var(key).is_err() {
                // SAFETY: called once, before any async runtime or thread is spawned.
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

/// Mirrors the `matterbridge` namespace's persisted keys (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub bridge_mode: BridgeMode,
    pub virtual_mode: VirtualMode,
    pub matter_port: u16,
    pub matter_passcode: u32,
    pub matter_discriminator: u16,
    pub matter_mdns_interface: Option<String>,
    pub matter_ipv4_address: Option<String>,
    pub matter_ipv6_address: Option<String>,
    pub matterbridge_log_level: String,
    pub matter_log_level: String,
    pub matterbridge_file_log: bool,
    pub matter_file_log: bool,
    pub vendor_id: u16,
    pub vendor_name: String,
    pub product_id: u16,
    pub product_name: String,
    pub frontend_port: u16,
    pub no_restore: bool,
    pub no_virtual: bool,
    pub readonly: bool,
    pub profile: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bridge_mode: BridgeMode::Bridge,
            virtual_mode: VirtualMode::Disabled,
            matter_port: 5540,
            matter_passcode: 20202021,
            matter_discriminator: 3840,
            matter_mdns_interface: None,
            matter_ipv4_address: None,
            matter_ipv6_address: None,
            matterbridge_log_level: "info".to_string(),
            matter_log_level: "info".to_string(),
            matterbridge_file_log: false,
            matter_file_log: false,
            vendor_id: 0xFFF1,
            vendor_name: "matterbridge-rs".to_string(),
            product_id: 0x8001,
            product_name: "Matterbridge".to_string(),
            frontend_port: 8283,
            no_restore: false,
            no_virtual: false,
            readonly: false,
            profile: None,
        }
    }
}

impl NodeConfig {
    /// Read back the persisted config from the `matterbridge` sub-storage,
    /// falling back to defaults for any key never written (fresh store).
    pub fn load(store: &SubStorage) -> Result<Self, StorageError> {
        let default = Self::default();
        Ok(Self {
            bridge_mode: store.get("bridgeMode", default.bridge_mode)?,
            virtual_mode: store.get("virtualmode", default.virtual_mode)?,
            matter_port: store.get("matterport", default.matter_port)?,
            matter_passcode: store.get("matterpasscode", default.matter_passcode)?,
            matter_discriminator: store.get("matterdiscriminator", default.matter_discriminator)?,
            matter_mdns_interface: store.get_opt("mattermdnsinterface")?,
            matter_ipv4_address: store.get_opt("matteripv4address")?,
            matter_ipv6_address: store.get_opt("matteripv6address")?,
            matterbridge_log_level: store.get("matterbridgeLogLevel", default.matterbridge_log_level)?,
            matter_log_level: store.get("matterLogLevel", default.matter_log_level)?,
            matterbridge_file_log: store.get("matterbridgeFileLog", default.matterbridge_file_log)?,
            matter_file_log: store.get("matterFileLog", default.matter_file_log)?,
            vendor_id: default.vendor_id,
            vendor_name: default.vendor_name,
            product_id: default.product_id,
            product_name: default.product_name,
            frontend_port: default.frontend_port,
            no_restore: default.no_restore,
            no_virtual: default.no_virtual,
            readonly: default.readonly,
            profile: default.profile,
        })
    }

    /// Persist the current config back to the `matterbridge` sub-storage.
    pub fn save(&self, store: &SubStorage) -> Result<(), StorageError> {
        store.set("bridgeMode", &self.bridge_mode)?;
        store.set("virtualmode", &self.virtual_mode)?;
        store.set("matterport", &self.matter_port)?;
        store.set("matterpasscode", &self.matter_passcode)?;
        store.set("matterdiscriminator", &self.matter_discriminator)?;
        if let Some(v) = &self.matter_mdns_interface {
            store.set("mattermdnsinterface", v)?;
        }
        if let Some(v) = &self.matter_ipv4_address {
            store.set("matteripv4address", v)?;
        }
        if let Some(v) = &self.matter_ipv6_address {
            store.set("matteripv6address", v)?;
        }
        store.set("matterbridgeLogLevel", &self.matterbridge_log_level)?;
        store.set("matterLogLevel", &self.matter_log_level)?;
        store.set("matterbridgeFileLog", &self.matterbridge_file_log)?;
        store.set("matterFileLog", &self.matter_file_log)?;
        Ok(())
    }

    /// Apply CLI overrides on top of the persisted config (CLI takes
    /// precedence — §4.5 "Seed allocation" precedence order, generalized to
    /// every operator-visible setting).
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(mode) = cli.run_mode() {
            self.bridge_mode = mode;
        }
        if let Some(port) = cli.port {
            self.matter_port = port;
        }
        if let Some(iface) = &cli.mdnsinterface {
            self.matter_mdns_interface = Some(iface.clone());
        }
        if let Some(addr) = &cli.ipv4address {
            self.matter_ipv4_address = Some(addr.clone());
        }
        if let Some(addr) = &cli.ipv6address {
            self.matter_ipv6_address = Some(addr.clone());
        }
        if let Some(vid) = cli.vendor_id {
            self.vendor_id = vid;
        }
        if let Some(name) = &cli.vendor_name {
            self.vendor_name = name.clone();
        }
        if let Some(pid) = cli.product_id {
            self.product_id = pid;
        }
        if let Some(name) = &cli.product_name {
            self.product_name = name.clone();
        }
        if let Some(port) = cli.frontend {
            self.frontend_port = port;
        }
        if let Some(level) = &cli.logger {
            self.matterbridge_log_level = level.clone();
        }
        if let Some(level) = &cli.matterlogger {
            self.matter_log_level = level.clone();
        }
        if cli.filelogger {
            self.matterbridge_file_log = true;
        }
        if cli.matterfilelogger {
            self.matter_file_log = true;
        }
        self.no_restore = cli.norestore;
        self.no_virtual = cli.novirtual;
        self.readonly = cli.readonly;
        if cli.novirtual {
            self.virtual_mode = VirtualMode::Disabled;
        }
        if let Some(profile) = &cli.profile {
            self.profile = Some(profile.clone());
        }
        self
    }

    /// Apply the pairing-file identity override (§4.8), if a
    /// passcode+discriminator pair was supplied.
    pub fn apply_pairing_seeds(&mut self, pairing: &crate::pairing::PairingOverride) {
        if let Some((passcode, discriminator)) = pairing.passcode_and_discriminator {
            self.matter_passcode = passcode;
            self.matter_discriminator = discriminator;
        }
        if let Some(vid) = pairing.vendor_id {
            self.vendor_id = vid;
        }
        if let Some(pid) = pairing.product_id {
            self.product_id = pid;
        }
    }
}
