//! CLI surface (§6).
//!
//! Flags map almost one-to-one onto the spec's table; long-form only,
//! matching the source tool this was distilled from. Run-mode flags
//! (`--bridge`/`--childbridge`/`--controller`/`--test`) and the
//! exit-after plugin-management/destructive commands are mutually
//! exclusive by convention, not by `clap` group enforcement, so that an
//! operator combining e.g. `--bridge --port 5541` still works uniformly.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "matterbridge", about = "Matter bridge supervisor")]
pub struct Cli {
    // --- run modes ---
    #[arg(long)]
    pub bridge: bool,
    #[arg(long)]
    pub childbridge: bool,
    #[arg(long)]
    pub controller: bool,
    #[arg(long)]
    pub test: bool,

    // --- network / identity ---
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub mdnsinterface: Option<String>,
    #[arg(long)]
    pub ipv4address: Option<String>,
    #[arg(long)]
    pub ipv6address: Option<String>,
    #[arg(long)]
    pub vendor_id: Option<u16>,
    #[arg(long)]
    pub vendor_name: Option<String>,
    #[arg(long)]
    pub product_id: Option<u16>,
    #[arg(long)]
    pub product_name: Option<String>,
    #[arg(long)]
    pub frontend: Option<u16>,

    // --- logging ---
    #[arg(long)]
    pub logger: Option<String>,
    #[arg(long)]
    pub matterlogger: Option<String>,
    #[arg(long)]
    pub filelogger: bool,
    #[arg(long)]
    pub matterfilelogger: bool,

    // --- plugin management (exits after) ---
    #[arg(long)]
    pub add: Option<String>,
    #[arg(long)]
    pub remove: Option<String>,
    #[arg(long)]
    pub enable: Option<String>,
    #[arg(long)]
    pub disable: Option<String>,
    #[arg(long)]
    pub list: bool,
    #[arg(long)]
    pub logstorage: bool,
    #[arg(long)]
    pub loginterfaces: bool,

    // --- destructive (exit after) ---
    /// Bare `--reset` clears bridge commissioning; `--reset <plugin>` clears
    /// that plugin's Matter namespace (§6, §7 example 4).
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub reset: Option<String>,
    #[arg(long)]
    pub factoryreset: bool,

    // --- behavior ---
    #[arg(long)]
    pub service: bool,
    #[arg(long)]
    pub docker: bool,
    #[arg(long)]
    pub homedir: Option<PathBuf>,
    #[arg(long)]
    pub ssl: bool,
    #[arg(long)]
    pub mtls: bool,
    #[arg(long)]
    pub norestore: bool,
    #[arg(long)]
    pub novirtual: bool,
    #[arg(long)]
    pub readonly: bool,
    #[arg(long)]
    pub shelly: bool,
    #[arg(long)]
    pub sudo: bool,
    #[arg(long)]
    pub nosudo: bool,
    #[arg(long)]
    pub profile: Option<String>,
    #[arg(long)]
    pub delay: Option<u64>,
    #[arg(long)]
    pub fixed_delay: Option<u64>,
}

/// The exit-after command implied by the flags, if any. CLI dispatch
/// (§4.7 "dispatch CLI or enter one of the three run modes") checks this
/// before the supervisor ever builds a run mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Add(String),
    Remove(String),
    Enable(String),
    Disable(String),
    List,
    LogStorage,
    LogInterfaces,
    Reset(Option<String>),
    FactoryReset,
}

impl Cli {
    pub fn command(&self) -> Option<CliCommand> {
        if let Some(r) = &self.add {
            return Some(CliCommand::Add(r.clone()));
        }
        if let Some(r) = &self.remove {
            return Some(CliCommand::Remove(r.clone()));
        }
        if let Some(r) = &self.enable {
            return Some(CliCommand::Enable(r.clone()));
        }
        if let Some(r) = &self.disable {
            return Some(CliCommand::Disable(r.clone()));
        }
        if self.list {
            return Some(CliCommand::List);
        }
        if self.logstorage {
            return Some(CliCommand::LogStorage);
        }
        if self.loginterfaces {
            return Some(CliCommand::LogInterfaces);
        }
        if self.factoryreset {
            return Some(CliCommand::FactoryReset);
        }
        if let Some(plugin) = &self.reset {
            return Some(CliCommand::Reset(if plugin.is_empty() {
                None
            } else {
                Some(plugin.clone())
            }));
        }
        None
    }

    pub fn run_mode(&self) -> Option<crate::topology::BridgeMode> {
        if self.bridge {
            Some(crate::topology::BridgeMode::Bridge)
        } else if self.childbridge {
            Some(crate::topology::BridgeMode::Childbridge)
        } else if self.controller {
            Some(crate::topology::BridgeMode::Controller)
        } else if self.test {
            Some(crate::topology::BridgeMode::Test)
        } else {
            None
        }
    }
}
