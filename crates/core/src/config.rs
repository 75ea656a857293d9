//! Application configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file under
//! the user's config directory, then `FLEETCTL_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Directory name used under the platform config and data roots.
pub const APP_DIR: &str = "fleetctl";
/// File name of the TOML config inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix for environment overrides, e.g. `FLEETCTL_FLEET_FILE`.
pub const ENV_PREFIX: &str = "FLEETCTL";

/// Runtime settings for the fleet manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record file opened on startup and used as the default save target.
    pub fleet_file: PathBuf,
    /// Where timestamped backups are written before a load replaces the fleet.
    pub backup_dir: PathBuf,
    /// Directory for the application log file.
    pub log_dir: PathBuf,
    /// Seed the demonstration fleet when `fleet_file` does not exist yet.
    pub seed_sample_fleet: bool,
    /// Activity entries kept in the UI.
    pub activity_log_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = data_root();
        Self {
            fleet_file: data.join("fleet.csv"),
            backup_dir: data.join("backups"),
            log_dir: data.join("logs"),
            seed_sample_fleet: true,
            activity_log_len: 200,
        }
    }
}

impl AppConfig {
    /// Load from the default config path plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (which may be missing) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("fleet_file", path_string(&defaults.fleet_file))?
            .set_default("backup_dir", path_string(&defaults.backup_dir))?
            .set_default("log_dir", path_string(&defaults.log_dir))?
            .set_default("seed_sample_fleet", defaults.seed_sample_fleet)?
            .set_default("activity_log_len", defaults.activity_log_len as i64)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

/// Default location of the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Default root for fleet data, backups and logs.
pub fn data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write a commented default config file if none exists. Returns its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

/// Write the commented template to `path` unless a file is already there.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, default_template(&AppConfig::default()))
        .with_context(|| format!("failed to write {}", path.display()))
}

fn default_template(defaults: &AppConfig) -> String {
    format!(
        "# fleetctl configuration. Uncomment a key to override its default.\n\
         # Every key can also be set through {prefix}_<KEY> environment variables.\n\
         \n\
         # fleet_file = \"{fleet}\"\n\
         # backup_dir = \"{backups}\"\n\
         # log_dir = \"{logs}\"\n\
         # seed_sample_fleet = {seed}\n\
         # activity_log_len = {activity}\n",
        prefix = ENV_PREFIX,
        fleet = defaults.fleet_file.display(),
        backups = defaults.backup_dir.display(),
        logs = defaults.log_dir.display(),
        seed = defaults.seed_sample_fleet,
        activity = defaults.activity_log_len,
    )
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        let defaults = AppConfig::default();
        assert_eq!(config.seed_sample_fleet, defaults.seed_sample_fleet);
        assert_eq!(config.activity_log_len, defaults.activity_log_len);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "fleet_file = \"/tmp/depot.csv\"\nseed_sample_fleet = false\nactivity_log_len = 12\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.fleet_file, PathBuf::from("/tmp/depot.csv"));
        assert!(!config.seed_sample_fleet);
        assert_eq!(config.activity_log_len, 12);
        Ok(())
    }

    #[test]
    fn template_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        write_default_config(&path)?;
        let first = fs::read_to_string(&path)?;
        assert!(first.contains("# seed_sample_fleet = true"));

        fs::write(&path, "activity_log_len = 5\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "activity_log_len = 5\n");
        assert_eq!(AppConfig::load_from(&path)?.activity_log_len, 5);
        Ok(())
    }
}
