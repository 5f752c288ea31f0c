use crate::kernel::state::NotificationLevel;
use crate::kernel::terminal::default_working_directory;
use crate::kernel::{Action, Effect};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_terminal_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::NewSession {
                shell,
                working_directory,
            } => {
                let shell = shell.unwrap_or_else(|| self.state.settings.shell.shell());
                let working_directory = working_directory
                    .or_else(|| self.state.explorer.root_path().map(|p| p.to_path_buf()))
                    .unwrap_or_else(default_working_directory);
                DispatchResult::effect(Effect::CreateSession {
                    shell,
                    working_directory,
                })
            }
            Action::SessionCreated {
                id,
                shell,
                working_directory,
            } => DispatchResult::changed(self.state.terminal.add_session(
                id,
                shell,
                working_directory,
            )),
            Action::SessionCreateFailed { shell, error } => {
                self.state.notify(
                    NotificationLevel::Error,
                    format!("Failed to start {}: {error}", shell.display_name()),
                );
                DispatchResult::changed(true)
            }
            Action::CloseSession(id) => {
                if !self.state.terminal.remove_session(id) {
                    return DispatchResult::unchanged();
                }
                DispatchResult {
                    effects: vec![Effect::TerminateSession(id)],
                    state_changed: true,
                }
            }
            Action::SessionTerminateFailed { id, error } => {
                self.state.notify(
                    NotificationLevel::Warning,
                    format!("Session {id} did not shut down cleanly: {error}"),
                );
                DispatchResult::changed(true)
            }
            Action::FocusSession(id) => {
                DispatchResult::changed(self.state.terminal.set_active_session(id))
            }
            Action::SetTerminalVisible(visible) => {
                DispatchResult::changed(self.state.terminal.set_visible(visible))
            }
            Action::SubmitCommand { session, text } => {
                let (state_changed, request) = self.state.terminal.submit_command(session, &text);
                DispatchResult {
                    effects: request.map(Effect::RunCommand).into_iter().collect(),
                    state_changed,
                }
            }
            Action::CommandFinished { session, result } => {
                let Some(completion) = self.state.terminal.apply_result(session, result) else {
                    tracing::debug!(session = %session, "dropping result for idle or closed session");
                    return DispatchResult::unchanged();
                };

                let mut effects = Vec::new();
                if completion.refresh_working_directory {
                    effects.push(Effect::QueryWorkingDirectory {
                        session,
                        delay: self.state.settings.shell.cwd_refresh_delay(),
                    });
                }
                if let Some(next) = completion.next {
                    effects.push(Effect::RunCommand(next));
                }
                DispatchResult {
                    effects,
                    state_changed: true,
                }
            }
            Action::WorkingDirectoryResolved { session, result } => match result {
                Ok(path) => DispatchResult::changed(
                    self.state.terminal.apply_working_directory(session, path),
                ),
                Err(err) => {
                    tracing::debug!(session = %session, error = %err, "cwd refresh failed");
                    DispatchResult::unchanged()
                }
            },
            _ => DispatchResult::unchanged(),
        }
    }
}
