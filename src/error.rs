//! Error taxonomy for the supervisor.
//!
//! Every error that can surface out of a component below is one of the
//! variants here. Recovery policy is documented per-variant; see
//! `SPEC_FULL.md` §7 for the authoritative table.

use thiserror::Error as ThisError;

/// Errors from the persistent key/value store (§4.1).
#[derive(ThisError, Debug)]
pub enum StorageError {
    #[error("storage root {0} could not be opened: {1}")]
    OpenFailed(std::path::PathBuf, std::io::Error),

    #[error("sub-storage `{0}` is corrupt: {1}")]
    Corrupt(String, String),

    #[error("store is corrupt and --norestore is set")]
    CorruptNoRestore,

    #[error("failed to copy tree from {0} to {1}: {2}")]
    CopyTreeFailed(std::path::PathBuf, std::path::PathBuf, String),

    #[error("key `{0}` in sub-storage `{1}` failed to deserialize: {2}")]
    Deserialize(String, String, serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("underlying store backend error: {0}")]
    Backend(String),
}

/// Errors from plugin lifecycle operations (§4.4, §7).
#[derive(ThisError, Debug)]
pub enum PluginError {
    #[error("plugin `{0}` is already registered")]
    AlreadyRegistered(String),

    #[error("plugin `{0}` is not registered")]
    NotRegistered(String),

    #[error("manifest for plugin `{0}` is missing")]
    ManifestMissing(String),

    #[error("manifest for plugin `{0}` is malformed: {1}")]
    ManifestMalformed(String, String),

    #[error("plugin `{0}` failed to load: {1}")]
    LoadFailed(String, String),

    #[error("plugin `{0}` failed to start: {1}")]
    StartFailed(String, String),

    #[error("plugin `{0}` failed to configure: {1}")]
    ConfigureFailed(String, String),

    #[error("accessory platform plugin `{0}` may register exactly one device")]
    ExactlyOneDevice(String),

    #[error("plugin `{0}` is locked; its server node already exists")]
    Locked(String),

    #[error("reinstall of plugin `{0}` failed: {1}")]
    ReinstallFailed(String, String),
}

/// Errors from the Matter runtime adapter boundary (§4.2, §7).
#[derive(ThisError, Debug)]
pub enum MatterError {
    #[error("failed to initialize Matter stack for store `{0}`: {1}")]
    InitFailed(String, String),

    #[error("server node `{0}` failed to start: {1}")]
    ServerNodeStartFailed(String, String),

    #[error("server node `{0}` did not close within {1:?}")]
    ServerNodeCloseTimeout(String, std::time::Duration),

    #[error("adapter rejected endpoint on `{0}`: {1}")]
    AddEndpointError(String, String),

    #[error("attribute subscribe failed on {cluster:#06x}/{attribute:#06x}: {source}")]
    SubscribeFailed {
        cluster: u32,
        attribute: u32,
        source: String,
    },
}

/// Errors from configuration loading/validation (§4.7, §4.8, §7).
#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("network interface `{0}` is not present on this host")]
    InvalidNetworkConfig(String),

    #[error("pairing file at {0} could not be read: {1}")]
    PairingFileUnreadable(std::path::PathBuf, std::io::Error),

    #[error("pairing file at {0} is not valid JSON: {1}")]
    PairingFileMalformed(std::path::PathBuf, serde_json::Error),

    #[error("pairing file field `{0}` failed validation: {1}")]
    PairingFieldInvalid(&'static str, String),

    #[error("installed runtime version {0} is below the required minimum {1}")]
    RuntimeTooOld(String, String),
}

/// Top-level error type the supervisor surfaces to its caller (`main`).
#[derive(ThisError, Debug)]
pub enum SupervisorError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Matter(#[from] MatterError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("another supervisor instance is already running against this home directory")]
    AlreadyRunning,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SupervisorError> = std::result::Result<T, E>;
