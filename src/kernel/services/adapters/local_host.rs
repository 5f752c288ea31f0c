//! Host runtime backed by the local filesystem and OS shells.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::process::Command;
use tokio::sync::watch;

use crate::kernel::explorer::sort_entries;
use crate::kernel::services::ports::{
    CommandOutput, DirEntryInfo, FileFilter, HostError, HostResult, HostRuntime, SessionId,
    Settings, ShellKind,
};

/// Printed after every command so the post-command cwd can be read back.
const CWD_MARKER: &str = "__DESKCORE_CWD__:";

#[derive(Debug, Clone)]
struct SessionEntry {
    shell: ShellKind,
    cwd: PathBuf,
    /// Flipped to `true` on terminate; running commands watch it.
    cancel: Arc<watch::Sender<bool>>,
}

pub struct LocalHost {
    sessions: Mutex<FxHashMap<SessionId, SessionEntry>>,
    next_session: AtomicU64,
    dialog_answers: Mutex<VecDeque<PathBuf>>,
    show_hidden: bool,
    command_timeout: Option<Duration>,
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHost {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(FxHashMap::default()),
            next_session: AtomicU64::new(1),
            dialog_answers: Mutex::new(VecDeque::new()),
            show_hidden: false,
            command_timeout: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_show_hidden(settings.explorer.show_hidden)
            .with_command_timeout(settings.shell.command_timeout())
    }

    pub fn with_show_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// There is no native dialog backend; the next picker call answers with
    /// `path` instead of reporting a cancel.
    pub fn queue_dialog_answer(&self, path: PathBuf) {
        self.dialog_answers.lock().push_back(path);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    fn next_dialog_answer(&self) -> Option<PathBuf> {
        self.dialog_answers.lock().pop_front()
    }

    fn session(&self, id: SessionId) -> HostResult<SessionEntry> {
        self.sessions
            .lock()
            .get(&id)
            .cloned()
            .ok_or(HostError::SessionNotFound(id))
    }
}

#[async_trait]
impl HostRuntime for LocalHost {
    async fn list_directory(&self, path: &Path) -> HostResult<Vec<DirEntryInfo>> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| HostError::io(path, e))?;
        if !meta.is_dir() {
            return Err(HostError::NotADirectory(path.to_path_buf()));
        }

        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| HostError::io(path, e))?;
        let mut result = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HostError::io(path, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }
            let entry_path = entry.path();
            let is_dir = match entry.file_type().await {
                Ok(ft) if ft.is_symlink() => tokio::fs::metadata(&entry_path)
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false),
                Ok(ft) => ft.is_dir(),
                Err(_) => continue,
            };
            result.push(DirEntryInfo {
                name,
                path: entry_path,
                is_dir,
            });
        }

        sort_entries(&mut result);
        Ok(result)
    }

    async fn read_file(&self, path: &Path) -> HostResult<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HostError::io(path, e))
    }

    async fn write_file(&self, path: &Path, text: &str) -> HostResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HostError::io(parent, e))?;
        }
        tokio::fs::write(path, text)
            .await
            .map_err(|e| HostError::io(path, e))
    }

    async fn open_file_picker(&self) -> HostResult<Option<PathBuf>> {
        Ok(self.next_dialog_answer())
    }

    async fn open_folder_picker(&self) -> HostResult<Option<PathBuf>> {
        Ok(self.next_dialog_answer())
    }

    async fn open_save_dialog(
        &self,
        default_name: &str,
        _filters: &[FileFilter],
    ) -> HostResult<Option<PathBuf>> {
        tracing::debug!(default_name, "save dialog requested");
        Ok(self.next_dialog_answer())
    }

    async fn create_session(&self, shell: ShellKind, cwd: &Path) -> HostResult<SessionId> {
        let meta = tokio::fs::metadata(cwd)
            .await
            .map_err(|e| HostError::io(cwd, e))?;
        if !meta.is_dir() {
            return Err(HostError::NotADirectory(cwd.to_path_buf()));
        }

        let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        let (cancel, _) = watch::channel(false);
        self.sessions.lock().insert(
            id,
            SessionEntry {
                shell,
                cwd: cwd.to_path_buf(),
                cancel: Arc::new(cancel),
            },
        );
        tracing::info!(session = %id, ?shell, cwd = %cwd.display(), "session created");
        Ok(id)
    }

    async fn terminate_session(&self, id: SessionId) -> HostResult<()> {
        let entry = self
            .sessions
            .lock()
            .remove(&id)
            .ok_or(HostError::SessionNotFound(id))?;
        entry.cancel.send_replace(true);
        tracing::info!(session = %id, "session terminated");
        Ok(())
    }

    async fn run_command(
        &self,
        id: SessionId,
        command: &str,
        cwd: &Path,
    ) -> HostResult<CommandOutput> {
        let session = self.session(id)?;
        let mut cancel = session.cancel.subscribe();
        let mut cmd = shell_command(session.shell, command);
        cmd.current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| HostError::Spawn(e.to_string()))?;
        let finished = async {
            match self.command_timeout {
                Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                    .await
                    .map_err(|_| HostError::Timeout {
                        millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    })?,
                None => child.wait_with_output().await,
            }
            .map_err(|e| HostError::Spawn(e.to_string()))
        };

        // Dropping `finished` drops the child, and `kill_on_drop` kills it.
        let output = tokio::select! {
            output = finished => output?,
            () = terminated(&mut cancel) => {
                tracing::info!(session = %id, "command killed with its session");
                return Err(HostError::Terminated(id));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let (text, reported_cwd) = split_cwd_marker(&stdout);

        let mut combined = text.trim_end().to_string();
        let stderr = stderr.trim_end();
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(stderr);
        }

        if let Some(new_cwd) = &reported_cwd {
            if let Some(entry) = self.sessions.lock().get_mut(&id) {
                entry.cwd = new_cwd.clone();
            }
        }

        tracing::debug!(
            session = %id,
            status = ?output.status.code(),
            cwd = ?reported_cwd,
            "command finished"
        );

        Ok(CommandOutput {
            is_error: !output.status.success(),
            output: combined,
            working_directory: reported_cwd,
        })
    }

    async fn query_working_directory(&self, id: SessionId) -> HostResult<PathBuf> {
        self.session(id).map(|entry| entry.cwd)
    }
}

fn shell_command(shell: ShellKind, command: &str) -> Command {
    let (program, args) = shell_invocation(shell, command);
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

/// Program and arguments that run `command` and then print the cwd trailer.
/// The exit status is always the one `command` left behind.
pub(crate) fn shell_invocation(shell: ShellKind, command: &str) -> (&'static str, Vec<String>) {
    match shell {
        ShellKind::Sh | ShellKind::Bash => {
            let program = if shell == ShellKind::Bash { "bash" } else { "sh" };
            let script = format!(
                "{command}\n__deskcore_rc=$?\nprintf '\\n{CWD_MARKER}%s\\n' \"$PWD\"\nexit $__deskcore_rc"
            );
            (program, vec!["-c".to_string(), script])
        }
        ShellKind::PowerShell => {
            let program = if cfg!(windows) { "powershell" } else { "pwsh" };
            // `$LASTEXITCODE` is only set by native programs; a failed cmdlet
            // shows up in `$?` alone.
            let script = format!(
                "{command}; $__deskcoreOk = $?; \
                 $__deskcoreRc = if ($__deskcoreOk) {{ 0 }} elseif ($LASTEXITCODE) {{ $LASTEXITCODE }} else {{ 1 }}; \
                 Write-Output \"{CWD_MARKER}$((Get-Location).Path)\"; exit $__deskcoreRc"
            );
            (
                program,
                vec![
                    "-NoLogo".to_string(),
                    "-NoProfile".to_string(),
                    "-Command".to_string(),
                    script,
                ],
            )
        }
        ShellKind::Cmd => {
            // `/V:ON` so `!ERRORLEVEL!` is read after `command` runs, not when
            // the line is parsed.
            let script = format!(
                "{command} & (set __deskcore_rc=!ERRORLEVEL!) & \
                 <nul set /p =\"{CWD_MARKER}\" & cd & exit /b !__deskcore_rc!"
            );
            ("cmd", vec!["/V:ON".to_string(), "/C".to_string(), script])
        }
    }
}

async fn terminated(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Splits the trailer written by [`shell_command`] off `stdout`.
pub(crate) fn split_cwd_marker(stdout: &str) -> (String, Option<PathBuf>) {
    let Some(at) = stdout.rfind(CWD_MARKER) else {
        return (stdout.to_string(), None);
    };
    let cwd = stdout[at + CWD_MARKER.len()..]
        .lines()
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    (stdout[..at].to_string(), cwd)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/local_host.rs"]
mod tests;
