use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::host::ShellKind;

const DEFAULT_CWD_REFRESH_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub shell: ShellSettings,
    #[serde(default)]
    pub explorer: ExplorerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_shell: Option<ShellKind>,
    /// Delay before asking the host for the cwd after a `cd`-like command.
    #[serde(default = "default_cwd_refresh_delay_ms")]
    pub cwd_refresh_delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_ms: Option<u64>,
}

fn default_cwd_refresh_delay_ms() -> u64 {
    DEFAULT_CWD_REFRESH_DELAY_MS
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            default_shell: None,
            cwd_refresh_delay_ms: DEFAULT_CWD_REFRESH_DELAY_MS,
            command_timeout_ms: None,
        }
    }
}

impl ShellSettings {
    pub fn shell(&self) -> ShellKind {
        self.default_shell.unwrap_or_default()
    }

    pub fn cwd_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.cwd_refresh_delay_ms)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerSettings {
    #[serde(default)]
    pub show_hidden: bool,
}
