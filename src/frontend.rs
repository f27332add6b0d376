//! Frontend outbound contract (§4.9).
//!
//! The core never talks to the (external, out of scope) UI transport
//! directly. It produces these four message shapes and hands them to
//! whatever implements [`Frontend`]; `NullFrontend` is the sink used when no
//! UI is attached (`--frontend 0`, tests).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshScope {
    Plugins,
    Settings,
    Matter,
    Fabrics,
    Sessions,
    Reachability,
}

impl fmt::Display for RefreshScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plugins => "plugins",
            Self::Settings => "settings",
            Self::Matter => "matter",
            Self::Fabrics => "fabrics",
            Self::Sessions => "sessions",
            Self::Reachability => "reachability",
        };
        f.write_str(s)
    }
}

/// One `attributeChanged` forward (§4.6 fan-out, §4.9).
#[derive(Debug, Clone)]
pub struct AttributeChanged {
    pub plugin: String,
    pub serial: String,
    pub unique_id: String,
    pub endpoint_number: u16,
    pub endpoint_id: u32,
    pub cluster: u32,
    pub attribute: u32,
    pub value: String,
}

/// Push-style notifications the core emits toward the (external) UI.
///
/// Implementations must not block the caller for long — §5 "Backpressure"
/// expects delivery to be attempted and dropped on overflow by the
/// transport, not by the core.
pub trait Frontend: Send + Sync {
    fn snackbar_message(&self, text: &str, timeout_sec: u32, severity: Severity);

    fn refresh_required(&self, scope: RefreshScope);

    fn attribute_changed(&self, change: AttributeChanged);

    fn log(&self, level: log::Level, time: chrono::DateTime<chrono::Utc>, logger_name: &str, line: &str);
}

/// Discards every notification. Used when `--frontend 0` disables the UI
/// transport, and by anything constructing a supervisor in tests.
pub struct NullFrontend;

impl Frontend for NullFrontend {
    fn snackbar_message(&self, _text: &str, _timeout_sec: u32, _severity: Severity) {}

    fn refresh_required(&self, _scope: RefreshScope) {}

    fn attribute_changed(&self, _change: AttributeChanged) {}

    fn log(&self, _level: log::Level, _time: chrono::DateTime<chrono::Utc>, _logger_name: &str, _line: &str) {}
}
