//! Command sessions and their output logs.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::collection::{ActiveList, Keyed};
use super::services::ports::{CommandOutput, HostError, SessionId, ShellKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Command,
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    pub kind: OutputKind,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl OutputEntry {
    fn now(kind: OutputKind, text: String) -> Self {
        Self {
            kind,
            text,
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingResult { command: String },
}

#[derive(Debug, Clone)]
pub struct CommandSession {
    pub id: SessionId,
    pub shell: ShellKind,
    pub working_directory: PathBuf,
    output: Vec<OutputEntry>,
    phase: SessionPhase,
    pending: VecDeque<String>,
}

impl CommandSession {
    pub fn new(id: SessionId, shell: ShellKind, working_directory: PathBuf) -> Self {
        Self {
            id,
            shell,
            working_directory,
            output: Vec::new(),
            phase: SessionPhase::Idle,
            pending: VecDeque::new(),
        }
    }

    pub fn output(&self) -> &[OutputEntry] {
        &self.output
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, SessionPhase::AwaitingResult { .. })
    }

    pub fn queued(&self) -> usize {
        self.pending.len()
    }

    pub fn title(&self) -> String {
        format!("{} ({})", self.shell.display_name(), self.id)
    }

    pub fn prompt(&self) -> String {
        let short = self
            .working_directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.working_directory.display().to_string());
        match self.shell {
            ShellKind::PowerShell => format!("PS {short}>"),
            _ => format!("{short}>"),
        }
    }

    fn begin(&mut self, command: String) -> RunRequest {
        self.output.push(OutputEntry::now(
            OutputKind::Command,
            format!("{}> {}", self.working_directory.display(), command),
        ));
        self.phase = SessionPhase::AwaitingResult {
            command: command.clone(),
        };
        RunRequest {
            session: self.id,
            command,
            working_directory: self.working_directory.clone(),
        }
    }
}

impl Keyed for CommandSession {
    type Key = SessionId;

    fn key(&self) -> &SessionId {
        &self.id
    }
}

/// A command ready to go to the host, scoped to the session's cwd at dispatch
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub session: SessionId,
    pub command: String,
    pub working_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    /// The host did not report a cwd but the command looked like a directory
    /// change.
    pub refresh_working_directory: bool,
    pub next: Option<RunRequest>,
}

#[derive(Debug)]
pub struct SessionMultiplexer {
    sessions: ActiveList<CommandSession>,
    visible: bool,
}

impl Default for SessionMultiplexer {
    fn default() -> Self {
        Self {
            sessions: ActiveList::new(),
            visible: false,
        }
    }
}

impl SessionMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(
        &mut self,
        id: SessionId,
        shell: ShellKind,
        working_directory: PathBuf,
    ) -> bool {
        let added = self
            .sessions
            .push_active(CommandSession::new(id, shell, working_directory));
        if added {
            self.visible = true;
            tracing::debug!(session = %id, ?shell, "session added");
        }
        added
    }

    pub fn remove_session(&mut self, id: SessionId) -> bool {
        if self.sessions.remove(&id).is_none() {
            return false;
        }
        if self.sessions.is_empty() {
            self.visible = false;
        }
        tracing::debug!(session = %id, remaining = self.sessions.len(), "session removed");
        true
    }

    /// Records the command and hands back the request to run, or queues it
    /// behind the one already in flight.
    pub fn submit_command(&mut self, id: SessionId, text: &str) -> (bool, Option<RunRequest>) {
        let command = text.trim();
        if command.is_empty() {
            return (false, None);
        }
        let Some(session) = self.sessions.get_mut(&id) else {
            return (false, None);
        };

        if session.is_busy() {
            session.pending.push_back(command.to_string());
            tracing::debug!(session = %id, queued = session.pending.len(), "command queued");
            return (true, None);
        }

        (true, Some(session.begin(command.to_string())))
    }

    /// Applies the reply for the in-flight command. `None` when the session is
    /// gone or was not waiting.
    pub fn apply_result(
        &mut self,
        id: SessionId,
        result: Result<CommandOutput, HostError>,
    ) -> Option<Completion> {
        let session = self.sessions.get_mut(&id)?;
        let SessionPhase::AwaitingResult { command } =
            std::mem::replace(&mut session.phase, SessionPhase::Idle)
        else {
            return None;
        };

        let mut completion = Completion::default();
        match result {
            Ok(output) => {
                let kind = if output.is_error {
                    OutputKind::Error
                } else {
                    OutputKind::Output
                };
                session
                    .output
                    .push(OutputEntry::now(kind, output.output.trim().to_string()));
                match output.working_directory {
                    Some(cwd) => session.working_directory = cwd,
                    None => completion.refresh_working_directory = is_directory_change(&command),
                }
            }
            Err(err) => {
                session
                    .output
                    .push(OutputEntry::now(OutputKind::Error, format!("Error: {err}")));
            }
        }

        if let Some(next) = session.pending.pop_front() {
            completion.next = Some(session.begin(next));
        }

        Some(completion)
    }

    pub fn apply_working_directory(&mut self, id: SessionId, path: PathBuf) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) if session.working_directory != path => {
                session.working_directory = path;
                true
            }
            _ => false,
        }
    }

    pub fn set_active_session(&mut self, id: SessionId) -> bool {
        self.sessions.set_active(&id)
    }

    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        true
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn active_session(&self) -> Option<&CommandSession> {
        self.sessions.active()
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.sessions.active_key().copied()
    }

    pub fn get(&self, id: SessionId) -> Option<&CommandSession> {
        self.sessions.get(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSession> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Lexical guess at whether `command` changes the working directory. Only
/// consulted when the host does not report the cwd itself.
pub fn is_directory_change(command: &str) -> bool {
    let Some(program) = command.split_whitespace().next() else {
        return false;
    };
    ["cd", "chdir", "pushd", "popd", "set-location"]
        .iter()
        .any(|known| program.eq_ignore_ascii_case(known))
}

pub fn default_working_directory() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf())
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/terminal.rs"]
mod tests;
