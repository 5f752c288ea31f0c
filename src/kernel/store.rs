mod documents;
mod explorer;
mod terminal;

use super::state::Notification;
use super::{Action, AppState, Effect};

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }

    fn effect(effect: Effect) -> Self {
        Self {
            effects: vec![effect],
            state_changed: false,
        }
    }
}

pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.state.take_notifications()
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        tracing::trace!(?action, "dispatch");
        match action {
            Action::OpenFileRequested
            | Action::OpenPath(_)
            | Action::NewFile { .. }
            | Action::UpdateContent { .. }
            | Action::FocusDocument(_)
            | Action::CloseDocument(_)
            | Action::SaveActive
            | Action::SaveActiveAs
            | Action::FilePicked(_)
            | Action::SavePathChosen { .. }
            | Action::FileLoaded { .. }
            | Action::FileLoadFailed { .. }
            | Action::FileSaved { .. }
            | Action::FileSaveFailed { .. } => self.reduce_document_action(action),

            Action::OpenFolderRequested
            | Action::OpenFolder(_)
            | Action::CloseFolder
            | Action::ToggleDirectory(_)
            | Action::FolderPicked(_)
            | Action::RootListed { .. }
            | Action::RootListFailed { .. }
            | Action::DirListed { .. }
            | Action::DirListFailed { .. } => self.reduce_explorer_action(action),

            Action::NewSession { .. }
            | Action::CloseSession(_)
            | Action::FocusSession(_)
            | Action::SubmitCommand { .. }
            | Action::SetTerminalVisible(_)
            | Action::SessionCreated { .. }
            | Action::SessionCreateFailed { .. }
            | Action::SessionTerminateFailed { .. }
            | Action::CommandFinished { .. }
            | Action::WorkingDirectoryResolved { .. } => self.reduce_terminal_action(action),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
