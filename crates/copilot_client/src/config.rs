//! Client config load/save for `~/.copilot/config.yaml`, plus base URL resolution.
//! Precedence for the backend base URL: explicit override, env var, config file, default.

use std::path::{Path, PathBuf};

/// Fallback backend origin when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Env var holding the backend base URL.
pub const BASE_URL_ENV: &str = "COPILOT_BACKEND_BASE_URL";

/// Env var overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "COPILOT_CONFIG";

/// Env var holding the origin the front end is served from.
pub const PAGE_ORIGIN_ENV: &str = "COPILOT_PAGE_ORIGIN";

/// API section (base_url and request defaults sent with every call).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Page section: where the front end itself is served from.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Full config file.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub page: PageSection,
}

impl Config {
    /// Base URL after applying the env var over the file value.
    pub fn base_url(&self) -> String {
        let env = std::env::var(BASE_URL_ENV).ok();
        resolve_base_url(env.as_deref(), self.api.base_url.as_deref())
    }

    /// Page origin after applying the env var over the file value.
    pub fn page_origin(&self) -> Option<String> {
        std::env::var(PAGE_ORIGIN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.page.origin.clone())
    }
}

/// Pick the first non-empty candidate, strip trailing slashes, else fall back to
/// [`DEFAULT_BASE_URL`].
pub fn resolve_base_url(env_value: Option<&str>, file_value: Option<&str>) -> String {
    [env_value, file_value]
        .into_iter()
        .flatten()
        .map(|v| v.trim().trim_end_matches('/'))
        .find(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Returns the default config file path: `~/.copilot/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".copilot").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load config if the file exists; a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::default())
    }
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let contents = serde_yaml::to_string(config).map_err(ConfigError::Serialize)?;
    std::fs::write(path, contents).map_err(io_err)
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),
}
