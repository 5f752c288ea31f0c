use std::path::PathBuf;

use crate::kernel::documents::{
    extension_of, file_name_of, has_valid_extension, DocumentId, DocumentPatch, OpenDocument,
};
use crate::kernel::services::ports::FileFilter;
use crate::kernel::state::NotificationLevel;
use crate::kernel::{Action, Effect};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_document_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::OpenFileRequested => DispatchResult::effect(Effect::PickFile),
            Action::FilePicked(result) => match result {
                Ok(Some(path)) => self.open_path(path),
                Ok(None) => DispatchResult::unchanged(),
                Err(err) => {
                    self.state.notify(
                        NotificationLevel::Error,
                        format!("Could not open file picker: {err}"),
                    );
                    DispatchResult::changed(true)
                }
            },
            Action::OpenPath(path) => self.open_path(path),
            Action::FileLoaded { path, content } => {
                let id = DocumentId::from_path(&path);
                let docs = &mut self.state.documents;
                // Unsaved edits win over a re-read of the same file.
                if docs.get(&id).is_some_and(|doc| doc.dirty) {
                    return DispatchResult::changed(docs.set_active(&id));
                }
                let doc = OpenDocument::from_file(&path, content);
                DispatchResult::changed(docs.open_or_focus(DocumentPatch::from(doc)))
            }
            Action::FileLoadFailed { path, error } => {
                self.state.notify(
                    NotificationLevel::Error,
                    format!("Failed to open {}: {error}", path.display()),
                );
                DispatchResult::changed(true)
            }
            Action::NewFile { name } => {
                let name = name.trim();
                if !has_valid_extension(name) {
                    self.state.notify(
                        NotificationLevel::Warning,
                        format!("\"{name}\" needs a file extension"),
                    );
                    return DispatchResult::changed(true);
                }
                let id = self.state.documents.allocate_untitled_id();
                let doc = OpenDocument::untitled(id, name);
                DispatchResult::changed(self.state.documents.open_or_focus(doc.into()))
            }
            Action::UpdateContent { id, text } => {
                DispatchResult::changed(self.state.documents.update_content(&id, text))
            }
            Action::FocusDocument(id) => {
                DispatchResult::changed(self.state.documents.set_active(&id))
            }
            Action::CloseDocument(id) => DispatchResult::changed(self.state.documents.close(&id)),
            Action::SaveActive => {
                let Some(doc) = self.state.documents.active_document() else {
                    return DispatchResult::unchanged();
                };
                let effect = match &doc.path {
                    Some(path) => Effect::WriteFile {
                        id: doc.id.clone(),
                        path: path.clone(),
                        content: doc.content.clone(),
                        version: doc.version,
                    },
                    None => save_dialog(doc),
                };
                DispatchResult::effect(effect)
            }
            Action::SaveActiveAs => match self.state.documents.active_document() {
                Some(doc) => DispatchResult::effect(save_dialog(doc)),
                None => DispatchResult::unchanged(),
            },
            Action::SavePathChosen { id, result } => match result {
                Ok(Some(path)) => self.save_as(&id, path),
                Ok(None) => DispatchResult::unchanged(),
                Err(err) => {
                    self.state.notify(
                        NotificationLevel::Error,
                        format!("Could not open save dialog: {err}"),
                    );
                    DispatchResult::changed(true)
                }
            },
            Action::FileSaved { id, path, version } => {
                tracing::info!(id = %id, path = %path.display(), version, "document saved");
                let saved_elsewhere = self
                    .state
                    .documents
                    .get(&id)
                    .is_some_and(|doc| doc.path.as_deref() != Some(path.as_path()));
                if saved_elsewhere {
                    return DispatchResult::changed(self.finish_save_as(&id, path, version));
                }
                DispatchResult::changed(self.state.documents.mark_saved(&id, version))
            }
            Action::FileSaveFailed { id, path, error } => {
                tracing::warn!(id = %id, error = %error, "save failed");
                self.state.notify(
                    NotificationLevel::Error,
                    format!("Failed to save {}: {error}", path.display()),
                );
                DispatchResult::changed(true)
            }
            _ => DispatchResult::unchanged(),
        }
    }

    /// Already-open documents are only focused; their buffer is not re-read.
    fn open_path(&mut self, path: PathBuf) -> DispatchResult {
        let id = DocumentId::from_path(&path);
        if self.state.documents.contains(&id) {
            return DispatchResult::changed(self.state.documents.set_active(&id));
        }
        DispatchResult::effect(Effect::ReadFile(path))
    }

    /// The document keeps its id and path until the write succeeds.
    fn save_as(&mut self, id: &DocumentId, path: PathBuf) -> DispatchResult {
        let Some(doc) = self.state.documents.get(id) else {
            return DispatchResult::unchanged();
        };
        DispatchResult::effect(Effect::WriteFile {
            id: doc.id.clone(),
            path,
            content: doc.content.clone(),
            version: doc.version,
        })
    }

    /// Re-keys the document under its new path once the file exists there.
    fn finish_save_as(&mut self, old: &DocumentId, path: PathBuf, version: u64) -> bool {
        let Some(current) = self.state.documents.get(old) else {
            return false;
        };

        let name = file_name_of(&path);
        let doc = OpenDocument {
            id: DocumentId::from_path(&path),
            extension: extension_of(&name),
            name,
            content: current.content.clone(),
            path: Some(path),
            dirty: current.dirty,
            version: current.version,
        };
        let new_id = doc.id.clone();

        let displaced = self
            .state
            .documents
            .get(&new_id)
            .filter(|other| &other.id != old && other.dirty)
            .map(|other| other.name.clone());
        if let Some(name) = displaced {
            self.state.notify(
                NotificationLevel::Warning,
                format!("Unsaved changes in {name} were discarded; it was overwritten by save as"),
            );
        }

        let replaced = self.state.documents.replace_id(old, doc);
        self.state.documents.mark_saved(&new_id, version);
        replaced
    }
}

fn save_dialog(doc: &OpenDocument) -> Effect {
    let mut filters = Vec::with_capacity(2);
    if !doc.extension.is_empty() {
        let label = format!("{} (*.{})", doc.language().display_name(), doc.extension);
        filters.push(FileFilter::new(label, &[doc.extension.as_str()]));
    }
    filters.push(FileFilter::all_files());
    Effect::PickSavePath {
        id: doc.id.clone(),
        default_name: doc.name.clone(),
        filters,
    }
}
