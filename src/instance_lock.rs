//! Single instance lock using Unix socket.
//!
//! Enforces "exactly one supervisor process owns a given home directory at a
//! time" (§1 Non-goals, §5 "Singleton"). Uses a Unix socket which is
//! automatically cleaned up by the OS when the process dies, avoiding stale
//! lock files. The lock is keyed off the resolved home directory so two
//! supervisors against different `--homedir`/`--profile` combinations never
//! contend with each other.

use std::io;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for instance lock operations.
#[derive(Debug, Error)]
pub enum InstanceLockError {
    /// Another instance is already running.
    #[error("another instance is already running")]
    AlreadyRunning,

    /// I/O error during lock acquisition.
    #[error("failed to acquire instance lock: {0}")]
    Io(#[from] io::Error),
}

/// Single instance lock using a Unix socket.
///
/// The lock is held as long as this struct exists. When dropped, the socket
/// file is removed. If the process crashes, the OS automatically removes
/// the socket, preventing stale locks.
pub struct InstanceLock {
    _listener: UnixListener,
    path: PathBuf,
}

impl InstanceLock {
    /// Attempt to acquire the instance lock for `home_dir`.
    ///
    /// Returns `Ok(InstanceLock)` if this is the only instance running
    /// against that home directory. Returns
    /// `Err(InstanceLockError::AlreadyRunning)` if another instance holds
    /// the lock.
    pub fn acquire(home_dir: &Path) -> Result<Self, InstanceLockError> {
        let path = Self::socket_path(home_dir);

        // Remove stale socket if it exists but no process holds it
        // This handles the case where the process was SIGKILL'd and
        // the Drop handler never ran, but the OS released the socket
        if path.exists() {
            // Try to connect - if it fails, the socket is stale
            match std::os::unix::net::UnixStream::connect(&path) {
                Ok(_) => {
                    // Connection succeeded - another instance is running
                    return Err(InstanceLockError::AlreadyRunning);
                }
                Err(_) => {
                    // Connection failed - socket is stale, remove it
                    let _ = std::fs::remove_file(&path);
                }
            }
        }

        // Try to bind the socket
        match UnixListener::bind(&path) {
            Ok(listener) => Ok(Self {
                _listener: listener,
                path,
            }),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                // Race condition: another instance bound between our check and bind
                Err(InstanceLockError::AlreadyRunning)
            }
            Err(e) => Err(InstanceLockError::Io(e)),
        }
    }

    /// Get the path to the socket file for `home_dir`.
    ///
    /// Uses `XDG_RUNTIME_DIR` if available (auto-cleaned on logout),
    /// falling back to `/tmp`. The filename is salted with a hash of
    /// `home_dir` so distinct `--homedir`/`--profile` instances don't
    /// collide.
    pub fn socket_path(home_dir: &Path) -> PathBuf {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        home_dir.hash(&mut hasher);
        let salt = hasher.finish();

        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join(format!("matterbridge-supervisor-{salt:016x}.sock"))
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // Clean up the socket file on normal exit
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path_uses_xdg_runtime_dir() {
        std::env::set_var("XDG_RUNTIME_DIR", "/run/user/1000");
        let path = InstanceLock::socket_path(Path::new("/home/alice/.matterbridge"));
        assert!(path.starts_with("/run/user/1000"));
        assert!(path.to_string_lossy().contains("matterbridge-supervisor-"));
        std::env::remove_var("XDG_RUNTIME_DIR");
    }

    #[test]
    fn test_socket_path_fallback_to_tmp() {
        std::env::remove_var("XDG_RUNTIME_DIR");
        let path = InstanceLock::socket_path(Path::new("/home/alice/.matterbridge"));
        assert!(path.starts_with("/tmp"));
    }

    #[test]
    fn test_socket_path_differs_per_home_dir() {
        let a = InstanceLock::socket_path(Path::new("/home/alice/.matterbridge"));
        let b = InstanceLock::socket_path(Path::new("/home/bob/.matterbridge"));
        assert_ne!(a, b);
    }
}
