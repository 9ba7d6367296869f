use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ApiError;

pub const TOKEN_VAR: &str = "NOTION_TOKEN";
pub const VERSION_VAR: &str = "NOTION_VERSION";
pub const BASE_URL_VAR: &str = "NOTION_BASE_URL";
pub const TIMEOUT_VAR: &str = "NOTION_TIMEOUT_SECS";

pub const DEFAULT_API_VERSION: &str = "2022-06-28";
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything needed to talk to the Notion API.
#[derive(Clone)]
pub struct Settings {
    pub token: String,
    pub api_version: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("token", &mask_token(&self.token))
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Built-in default.
    Default,
    /// Not set anywhere.
    Missing,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug)]
pub struct SettingSources {
    pub token: SettingSource,
    pub api_version: SettingSource,
    pub base_url: SettingSource,
    pub timeout: SettingSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
struct ConfigFile {
    notion: Option<FileSettings>,
}

/// The `[notion]` table of the config file.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct FileSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from environment variables, then the config file, then
    /// defaults. A missing token is an error.
    pub fn load() -> Result<Self, ApiError> {
        let file = load_config_file();
        Self::resolve(|var| std::env::var(var).ok(), file.as_ref())
    }

    /// Resolve settings from an environment lookup and optional file values.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        file: Option<&FileSettings>,
    ) -> Result<Self, ApiError> {
        let env = |var: &str| env(var).filter(|v| !v.trim().is_empty());

        let token = env(TOKEN_VAR)
            .or_else(|| file.and_then(|f| f.token.clone()))
            .ok_or_else(|| {
                ApiError::Config(format!(
                    "Missing Notion token. Set {} env var or add it to the config file",
                    TOKEN_VAR
                ))
            })?;

        let api_version = env(VERSION_VAR)
            .or_else(|| file.and_then(|f| f.version.clone()))
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let base_url = env(BASE_URL_VAR)
            .or_else(|| file.and_then(|f| f.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match env(TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ApiError::Config(format!("{} must be a whole number of seconds", TIMEOUT_VAR))
            })?,
            None => file
                .and_then(|f| f.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            token,
            api_version,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Return the path to the config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("notion-merge").join("config.toml"))
}

/// Save settings to the config file, creating parent directories as needed.
/// Returns the path the file was written to.
pub fn save_to_file(settings: &Settings) -> Result<PathBuf, ApiError> {
    let path = config_path()
        .ok_or_else(|| ApiError::Config("Could not determine config directory".to_string()))?;
    save_to(&path, settings)?;
    Ok(path)
}

/// Write settings to `path`. Values equal to the defaults are left out.
pub fn save_to(path: &Path, settings: &Settings) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let timeout_secs = settings.timeout.as_secs();
    let config = ConfigFile {
        notion: Some(FileSettings {
            token: Some(settings.token.clone()),
            version: (settings.api_version != DEFAULT_API_VERSION)
                .then(|| settings.api_version.clone()),
            base_url: (settings.base_url != DEFAULT_BASE_URL).then(|| settings.base_url.clone()),
            timeout_secs: (timeout_secs != DEFAULT_TIMEOUT_SECS).then_some(timeout_secs),
        }),
    };

    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| ApiError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Read the `[notion]` table from `path`.
pub fn load_from(path: &Path) -> Result<Option<FileSettings>, ApiError> {
    let content = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&content)
        .map_err(|e| ApiError::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
    Ok(config.notion)
}

/// Determine where each setting is coming from.
pub fn setting_sources() -> SettingSources {
    let file = load_config_file();
    sources_from(|var| std::env::var(var).ok(), file.as_ref())
}

/// Provenance for an environment lookup and optional file values.
pub fn sources_from(
    env: impl Fn(&str) -> Option<String>,
    file: Option<&FileSettings>,
) -> SettingSources {
    let from = |var: &'static str, in_file: bool, default: SettingSource| {
        if env(var).is_some_and(|v| !v.trim().is_empty()) {
            SettingSource::EnvVar(var)
        } else if in_file {
            SettingSource::ConfigFile
        } else {
            default
        }
    };

    SettingSources {
        token: from(
            TOKEN_VAR,
            file.is_some_and(|f| f.token.is_some()),
            SettingSource::Missing,
        ),
        api_version: from(
            VERSION_VAR,
            file.is_some_and(|f| f.version.is_some()),
            SettingSource::Default,
        ),
        base_url: from(
            BASE_URL_VAR,
            file.is_some_and(|f| f.base_url.is_some()),
            SettingSource::Default,
        ),
        timeout: from(
            TIMEOUT_VAR,
            file.is_some_and(|f| f.timeout_secs.is_some()),
            SettingSource::Default,
        ),
    }
}

/// Show just enough of a token to recognise it.
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    if token.chars().count() <= 6 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

fn load_config_file() -> Option<FileSettings> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }
    match load_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Ignoring config file: {}", e);
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
