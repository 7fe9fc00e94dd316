use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_SQLITE_FILE: &str = "store.sqlite";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Sqlite,
    Rest,
}

/// Where records live once flags, the config file and defaults are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { path: PathBuf },
    Rest { url: String, key: String },
}

/// Command-line values; each one beats the matching file setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub backend: Option<Backend>,
    pub rest_url: Option<String>,
    pub rest_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigFile {
    #[serde(default)]
    store: RawStoreSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStoreSection {
    backend: Option<Backend>,
    sqlite_path: Option<PathBuf>,
    rest_url: Option<String>,
    rest_key: Option<String>,
}

/// Reads `<data_dir>/config.toml` if present and applies `overrides`.
pub fn load(data_dir: &Path, overrides: &ConfigOverrides) -> Result<StoreConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    resolve(data_dir, raw.as_deref(), overrides)
}

pub(crate) fn resolve(
    data_dir: &Path,
    raw: Option<&str>,
    overrides: &ConfigOverrides,
) -> Result<StoreConfig, ConfigError> {
    let file: RawConfigFile = match raw {
        Some(raw) => toml::from_str(raw)?,
        None => RawConfigFile::default(),
    };
    let section = file.store;
    let backend = overrides.backend.or(section.backend).unwrap_or_default();

    match backend {
        Backend::Sqlite => {
            let path = section
                .sqlite_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_FILE));
            let path = if path.is_absolute() {
                path
            } else {
                data_dir.join(path)
            };
            Ok(StoreConfig::Sqlite { path })
        }
        Backend::Rest => {
            let url = pick(overrides.rest_url.as_deref(), section.rest_url)
                .ok_or(ConfigError::MissingSetting("rest_url"))?;
            let key = pick(overrides.rest_key.as_deref(), section.rest_key)
                .ok_or(ConfigError::MissingSetting("rest_key"))?;
            Ok(StoreConfig::Rest { url, key })
        }
    }
}

fn pick(flag: Option<&str>, file: Option<String>) -> Option<String> {
    flag.map(str::to_string)
        .or(file)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Toml(toml::de::Error),
    MissingSetting(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ConfigError::Toml(err) => write!(f, "invalid config TOML: {}", err),
            ConfigError::MissingSetting(name) => {
                write!(f, "rest backend requires '{}' (flag, env or config file)", name)
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml(err) => Some(err),
            ConfigError::MissingSetting(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Toml(value)
    }
}
