use std::path::{Path, PathBuf};

use crate::kernel::services::ports::settings::Settings;
use crate::kernel::services::ports::ShellKind;

use super::paths::get_config_dir;

const SETTINGS_FILE: &str = "settings.json";

pub const ENV_SHELL: &str = "DESKCORE_SHELL";
pub const ENV_SHOW_HIDDEN: &str = "DESKCORE_SHOW_HIDDEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot determine settings directory")]
    NoConfigDir,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// Creates the settings file with defaults if it is missing.
pub fn ensure_settings_file_at(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&Settings::default())
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content).map_err(io_err)?;
    }
    Ok(())
}

pub fn ensure_settings_file() -> Result<PathBuf, ConfigError> {
    let path = get_settings_path().ok_or(ConfigError::NoConfigDir)?;
    ensure_settings_file_at(&path)?;
    Ok(path)
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Settings file (created on first run) plus environment overrides.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let path = ensure_settings_file()?;
    let mut settings = load_settings_from(&path)?;
    apply_env_overrides(&mut settings, |var| std::env::var(var).ok())?;
    tracing::debug!(path = %path.display(), ?settings, "settings loaded");
    Ok(settings)
}

pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup(ENV_SHELL).filter(|v| !v.trim().is_empty()) {
        let shell = value
            .parse::<ShellKind>()
            .map_err(|_| ConfigError::InvalidEnv {
                var: ENV_SHELL,
                value: value.clone(),
            })?;
        settings.shell.default_shell = Some(shell);
    }

    if let Some(value) = lookup(ENV_SHOW_HIDDEN) {
        settings.explorer.show_hidden = parse_flag(&value).ok_or(ConfigError::InvalidEnv {
            var: ENV_SHOW_HIDDEN,
            value,
        })?;
    }

    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
