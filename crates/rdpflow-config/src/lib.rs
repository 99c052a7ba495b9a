//! rdpflow settings
//!
//! Settings come from an optional YAML file, overridden by environment
//! variables. Only the resource group has no default.

pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "RDPFLOW_CONFIG_PATH";
pub const ENV_RESOURCE_GROUP: &str = "RDPFLOW_RESOURCE_GROUP";
pub const ENV_LOCATION: &str = "RDPFLOW_LOCATION";
pub const ENV_ADMIN_USERNAME: &str = "RDPFLOW_ADMIN_USERNAME";
pub const ENV_STORE_PATH: &str = "RDPFLOW_STORE_PATH";

const DEFAULT_LOCATION: &str = "eastus";
const DEFAULT_ADMIN_USERNAME: &str = "rdpadmin";
const DEFAULT_STORE_PATH: &str = "./vms.json";

/// Settings file as written on disk; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub resource_group: Option<String>,
    pub location: Option<String>,
    pub admin_username: Option<String>,
    pub store_path: Option<PathBuf>,
    pub vm: VmFileSettings,
    pub deletion_wait: WaitFileSettings,
    pub follow_up: FollowUpFileSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmFileSettings {
    pub image: Option<String>,
    pub size: Option<String>,
    pub public_ip_sku: Option<String>,
    /// Empty string disables custom data
    pub custom_data: Option<String>,
    pub rdp_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitFileSettings {
    pub interval_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FollowUpFileSettings {
    pub start_delay_secs: Option<u64>,
    pub stop_delay_secs: Option<u64>,
}

/// VM provisioning parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSettings {
    pub image: String,
    pub size: String,
    pub public_ip_sku: String,
    pub custom_data: Option<String>,
    pub rdp_port: u16,
}

impl Default for VmSettings {
    fn default() -> Self {
        Self {
            image: "Win2022Datacenter".to_string(),
            size: "Standard_B2s".to_string(),
            public_ip_sku: "Basic".to_string(),
            custom_data: Some("init.ps1".to_string()),
            rdp_port: 3389,
        }
    }
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub resource_group: String,
    pub location: String,
    pub admin_username: String,
    pub store_path: PathBuf,
    pub vm: VmSettings,
    pub deletion_interval: Duration,
    pub deletion_max_attempts: u32,
    pub start_follow_up: Duration,
    pub stop_follow_up: Duration,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Discover the settings file and apply environment overrides
    pub fn load() -> Result<Self> {
        let file = find_settings_file()?;
        Self::from_file_and_env(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Credential store location alone; needs no resource group
    pub fn load_store_path() -> Result<PathBuf> {
        let file = find_settings_file()?;
        Self::store_path_from_file_and_env(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn store_path_from_file_and_env<F>(file: Option<&Path>, env: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_value = match file {
            Some(path) => read_settings_file(path)?.store_path,
            None => None,
        };
        let env_value = env(ENV_STORE_PATH).filter(|v| !v.trim().is_empty());
        Ok(resolve_store_path(env_value, file_value))
    }

    /// Resolve settings from an optional file and an environment lookup
    pub fn from_file_and_env<F>(file: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = match file {
            Some(path) => read_settings_file(path)?,
            None => FileSettings::default(),
        };
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let resource_group = var(ENV_RESOURCE_GROUP)
            .or(parsed.resource_group)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingSetting {
                key: "resource_group",
                env: ENV_RESOURCE_GROUP,
            })?;

        let location = var(ENV_LOCATION)
            .or(parsed.location)
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let admin_username = var(ENV_ADMIN_USERNAME)
            .or(parsed.admin_username)
            .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());

        let store_path = resolve_store_path(var(ENV_STORE_PATH), parsed.store_path);

        let defaults = VmSettings::default();
        let vm = VmSettings {
            image: parsed.vm.image.unwrap_or(defaults.image),
            size: parsed.vm.size.unwrap_or(defaults.size),
            public_ip_sku: parsed.vm.public_ip_sku.unwrap_or(defaults.public_ip_sku),
            custom_data: match parsed.vm.custom_data {
                Some(script) if script.trim().is_empty() => None,
                Some(script) => Some(script),
                None => defaults.custom_data,
            },
            rdp_port: parsed.vm.rdp_port.unwrap_or(defaults.rdp_port),
        };

        let deletion_max_attempts = parsed.deletion_wait.max_attempts.unwrap_or(24);
        if deletion_max_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "deletion_wait.max_attempts",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            resource_group,
            location,
            admin_username,
            store_path,
            vm,
            deletion_interval: Duration::from_secs(
                parsed.deletion_wait.interval_secs.unwrap_or(5),
            ),
            deletion_max_attempts,
            start_follow_up: Duration::from_secs(parsed.follow_up.start_delay_secs.unwrap_or(10)),
            stop_follow_up: Duration::from_secs(parsed.follow_up.stop_delay_secs.unwrap_or(5)),
            source: file.map(Path::to_path_buf),
        })
    }
}

fn resolve_store_path(env_value: Option<String>, file_value: Option<PathBuf>) -> PathBuf {
    env_value
        .map(PathBuf::from)
        .or(file_value)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
}

/// rdpflow's directory under the user config dir
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("rdpflow"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Find the settings file
///
/// Search order:
/// 1. `RDPFLOW_CONFIG_PATH` (direct path)
/// 2. current directory: rdpflow.local.yaml, rdpflow.yaml
/// 3. ~/.config/rdpflow/config.yaml
///
/// Returns `Ok(None)` when no file exists; defaults and environment apply.
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points to a missing file: {}", ENV_CONFIG_PATH, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["rdpflow.local.yaml", "rdpflow.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

fn read_settings_file(path: &Path) -> Result<FileSettings> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(FileSettings::default());
    }
    tracing::debug!("Loading settings from {}", path.display());
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::fs;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_env_resource_group() {
        let settings =
            Settings::from_file_and_env(None, env_of(&[(ENV_RESOURCE_GROUP, "rdp-rg")])).unwrap();

        assert_eq!(settings.resource_group, "rdp-rg");
        assert_eq!(settings.location, "eastus");
        assert_eq!(settings.admin_username, "rdpadmin");
        assert_eq!(settings.store_path, PathBuf::from("./vms.json"));
        assert_eq!(settings.vm, VmSettings::default());
        assert_eq!(settings.deletion_interval, Duration::from_secs(5));
        assert_eq!(settings.deletion_max_attempts, 24);
        assert_eq!(settings.start_follow_up, Duration::from_secs(10));
        assert_eq!(settings.stop_follow_up, Duration::from_secs(5));
        assert!(settings.source.is_none());
    }

    #[test]
    fn test_missing_resource_group() {
        let result = Settings::from_file_and_env(None, env_of(&[]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingSetting {
                key: "resource_group",
                ..
            })
        ));

        let blank = Settings::from_file_and_env(None, env_of(&[(ENV_RESOURCE_GROUP, "  ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn test_file_values_and_env_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("rdpflow.yaml");
        fs::write(
            &path,
            "resource_group: file-rg\n\
             location: westeurope\n\
             admin_username: fileadmin\n\
             store_path: /data/vms.json\n\
             vm:\n  size: Standard_D2s_v5\n  custom_data: \"\"\n  rdp_port: 13389\n\
             deletion_wait:\n  interval_secs: 2\n  max_attempts: 10\n\
             follow_up:\n  start_delay_secs: 20\n",
        )
        .unwrap();

        let settings = Settings::from_file_and_env(
            Some(&path),
            env_of(&[(ENV_LOCATION, "northeurope")]),
        )
        .unwrap();

        assert_eq!(settings.resource_group, "file-rg");
        assert_eq!(settings.location, "northeurope");
        assert_eq!(settings.admin_username, "fileadmin");
        assert_eq!(settings.store_path, PathBuf::from("/data/vms.json"));
        assert_eq!(settings.vm.size, "Standard_D2s_v5");
        assert_eq!(settings.vm.image, "Win2022Datacenter");
        assert_eq!(settings.vm.custom_data, None);
        assert_eq!(settings.vm.rdp_port, 13389);
        assert_eq!(settings.deletion_interval, Duration::from_secs(2));
        assert_eq!(settings.deletion_max_attempts, 10);
        assert_eq!(settings.start_follow_up, Duration::from_secs(20));
        assert_eq!(settings.stop_follow_up, Duration::from_secs(5));
        assert_eq!(settings.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_store_path_without_resource_group() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("rdpflow.yaml");
        fs::write(&path, "store_path: /data/vms.json\n").unwrap();

        let from_file = Settings::store_path_from_file_and_env(Some(&path), env_of(&[])).unwrap();
        assert_eq!(from_file, PathBuf::from("/data/vms.json"));

        let from_env = Settings::store_path_from_file_and_env(
            Some(&path),
            env_of(&[(ENV_STORE_PATH, "/tmp/creds.json")]),
        )
        .unwrap();
        assert_eq!(from_env, PathBuf::from("/tmp/creds.json"));

        let default = Settings::store_path_from_file_and_env(None, env_of(&[])).unwrap();
        assert_eq!(default, PathBuf::from("./vms.json"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("rdpflow.yaml");
        fs::write(&path, "resource_group: rg\ndeletion_wait:\n  max_attempts: 0\n").unwrap();

        let result = Settings::from_file_and_env(Some(&path), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::InvalidSetting { .. })));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("rdpflow.yaml");
        fs::write(&path, "resource_group: rg\nresourcegroup: typo\n").unwrap();

        let result = Settings::from_file_and_env(Some(&path), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    #[serial]
    fn test_find_settings_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("rdpflow.yaml"), "resource_group: rg\n").unwrap();
        fs::write(temp_dir.path().join("rdpflow.local.yaml"), "resource_group: local\n").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_settings_file().unwrap().unwrap();

        // rdpflow.local.yaml wins
        assert!(result.ends_with("rdpflow.local.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_settings_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "resource_group: rg\n").unwrap();

        unsafe {
            std::env::set_var(ENV_CONFIG_PATH, config_path.to_str().unwrap());
        }

        let result = find_settings_file().unwrap();
        assert_eq!(result, Some(config_path));

        unsafe {
            std::env::remove_var(ENV_CONFIG_PATH);
        }
    }
}
