use crate::kernel::state::NotificationLevel;
use crate::kernel::{Action, Effect};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_explorer_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::OpenFolderRequested => DispatchResult::effect(Effect::PickFolder),
            Action::FolderPicked(result) => match result {
                Ok(Some(path)) => {
                    DispatchResult::effect(Effect::ListRoot(self.state.explorer.request_root(path)))
                }
                Ok(None) => DispatchResult::unchanged(),
                Err(err) => {
                    self.state.notify(
                        NotificationLevel::Error,
                        format!("Could not open folder picker: {err}"),
                    );
                    DispatchResult::changed(true)
                }
            },
            Action::OpenFolder(path) => {
                DispatchResult::effect(Effect::ListRoot(self.state.explorer.request_root(path)))
            }
            Action::RootListed {
                token,
                path,
                entries,
            } => DispatchResult::changed(
                self.state
                    .explorer
                    .apply_root_listing(token, &path, entries),
            ),
            Action::RootListFailed { token, path, error } => {
                if !self.state.explorer.apply_root_error(token, &path) {
                    return DispatchResult::unchanged();
                }
                self.state.notify(
                    NotificationLevel::Error,
                    format!("Failed to open folder {}: {error}", path.display()),
                );
                DispatchResult::changed(true)
            }
            Action::CloseFolder => DispatchResult::changed(self.state.explorer.clear()),
            Action::ToggleDirectory(path) => {
                let (state_changed, request) = self.state.explorer.toggle(&path);
                DispatchResult {
                    effects: request.map(Effect::ListDirectory).into_iter().collect(),
                    state_changed,
                }
            }
            Action::DirListed {
                generation,
                path,
                entries,
            } => DispatchResult::changed(
                self.state
                    .explorer
                    .apply_listing(generation, &path, entries),
            ),
            Action::DirListFailed {
                generation,
                path,
                error,
            } => {
                if !self.state.explorer.apply_listing_error(generation, &path) {
                    return DispatchResult::unchanged();
                }
                self.state.notify(
                    NotificationLevel::Error,
                    format!("Failed to read {}: {error}", path.display()),
                );
                DispatchResult::changed(true)
            }
            _ => DispatchResult::unchanged(),
        }
    }
}
