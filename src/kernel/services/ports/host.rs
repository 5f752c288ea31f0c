//! Host runtime contract: everything that touches the disk, dialogs or
//! processes goes through this trait.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("session {0} was terminated")]
    Terminated(SessionId),
    #[error("failed to start command: {0}")]
    Spawn(String),
    #[error("command timed out after {millis}ms")]
    Timeout { millis: u64 },
    #[error("not supported by this host: {0}")]
    Unsupported(&'static str),
}

impl HostError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }
}

/// Handle of a host-side shell process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Sh,
    Bash,
    PowerShell,
    Cmd,
}

impl ShellKind {
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::PowerShell
        } else {
            Self::Sh
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sh => "sh",
            Self::Bash => "Bash",
            Self::PowerShell => "PowerShell",
            Self::Cmd => "Command Prompt",
        }
    }
}

impl Default for ShellKind {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl FromStr for ShellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sh" => Ok(Self::Sh),
            "bash" => Ok(Self::Bash),
            "powershell" | "pwsh" => Ok(Self::PowerShell),
            "cmd" | "cmd.exe" => Ok(Self::Cmd),
            other => Err(format!("unknown shell: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirEntryInfo {
    pub fn new(path: PathBuf, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path, is_dir }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub is_error: bool,
    pub output: String,
    /// Working directory after the command ran, when the host can tell.
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn all_files() -> Self {
        Self::new("All Files", &["*"])
    }
}

#[async_trait]
pub trait HostRuntime: Send + Sync {
    async fn list_directory(&self, path: &Path) -> HostResult<Vec<DirEntryInfo>>;

    async fn read_file(&self, path: &Path) -> HostResult<String>;

    async fn write_file(&self, path: &Path, text: &str) -> HostResult<()>;

    /// `Ok(None)` means the user dismissed the dialog.
    async fn open_file_picker(&self) -> HostResult<Option<PathBuf>>;

    async fn open_folder_picker(&self) -> HostResult<Option<PathBuf>>;

    async fn open_save_dialog(
        &self,
        default_name: &str,
        filters: &[FileFilter],
    ) -> HostResult<Option<PathBuf>>;

    async fn create_session(&self, shell: ShellKind, cwd: &Path) -> HostResult<SessionId>;

    async fn terminate_session(&self, id: SessionId) -> HostResult<()>;

    async fn run_command(
        &self,
        id: SessionId,
        command: &str,
        cwd: &Path,
    ) -> HostResult<CommandOutput>;

    async fn query_working_directory(&self, id: SessionId) -> HostResult<PathBuf>;
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/host.rs"]
mod tests;
