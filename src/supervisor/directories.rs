//! Home-directory layout resolution (§6).

use std::path::PathBuf;

use crate::cli::Cli;

/// Every path the supervisor reads or writes, resolved once at startup.
/// Under a non-default `profile`, `/profiles/<name>/` is inserted after
/// `.matterbridge` and `.mattercert`'s top-level directory name.
#[derive(Debug, Clone)]
pub struct Directories {
    /// `.matterbridge/` — supervisor storage root.
    pub home: PathBuf,
    pub storage: PathBuf,
    pub storage_backup: PathBuf,
    pub matterstorage: PathBuf,
    pub matterstorage_backup: PathBuf,
    pub certs: PathBuf,
    pub uploads: PathBuf,
    pub matterbridge_log: PathBuf,
    pub matter_log: PathBuf,
    /// `Matterbridge/` — plugin working directory.
    pub plugin_dir: PathBuf,
    /// `.mattercert/` — pairing-file directory.
    pub cert_dir: PathBuf,
}

impl Directories {
    pub fn resolve(cli: &Cli, config_profile: Option<&str>) -> Self {
        let root = cli.homedir.clone().unwrap_or_else(|| {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
        });
        let profile = cli.profile.as_deref().or(config_profile);

        let mut home = root.join(".matterbridge");
        let mut cert_dir = root.join(".mattercert");
        let mut plugin_dir = root.join("Matterbridge");
        if let Some(name) = profile {
            home = home.join("profiles").join(name);
            cert_dir = cert_dir.join("profiles").join(name);
            plugin_dir = plugin_dir.join("profiles").join(name);
        }

        Self {
            storage: home.join("storage"),
            storage_backup: home.join("storage.backup"),
            matterstorage: home.join("matterstorage"),
            matterstorage_backup: home.join("matterstorage.backup"),
            certs: home.join("certs"),
            uploads: home.join("uploads"),
            matterbridge_log: home.join("matterbridge.log"),
            matter_log: home.join("matter.log"),
            plugin_dir,
            cert_dir,
            home,
        }
    }

    /// Create every directory this layout names (idempotent).
    pub fn ensure_all(&self) -> std::io::Result<()> {
        for dir in [
            &self.home,
            &self.certs,
            &self.uploads,
            &self.plugin_dir,
            &self.cert_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["matterbridge"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn profile_inserts_subdirectory() {
        let dirs = Directories::resolve(&cli(&["--homedir", "/srv/mb", "--profile", "work"]), None);
        assert_eq!(dirs.home, PathBuf::from("/srv/mb/.matterbridge/profiles/work"));
        assert_eq!(dirs.storage, PathBuf::from("/srv/mb/.matterbridge/profiles/work/storage"));
    }

    #[test]
    fn default_profile_is_flat() {
        let dirs = Directories::resolve(&cli(&["--homedir", "/srv/mb"]), None);
        assert_eq!(dirs.home, PathBuf::from("/srv/mb/.matterbridge"));
    }
}
