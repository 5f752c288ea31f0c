//! Open documents (editor tabs).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::collection::{ActiveList, Keyed};
use super::language::LanguageId;

const UNTITLED_PREFIX: &str = "untitled-";

/// Canonical absolute path of a saved document, or a placeholder for an
/// unsaved one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDocument {
    pub id: DocumentId,
    pub name: String,
    pub content: String,
    pub path: Option<PathBuf>,
    pub extension: String,
    #[serde(default)]
    pub dirty: bool,
    /// Bumped on every content change; a save only clears `dirty` for the
    /// version it wrote.
    #[serde(default)]
    pub version: u64,
}

impl OpenDocument {
    /// A document backed by `path`, keyed by the path itself.
    pub fn from_file(path: &Path, content: String) -> Self {
        let name = file_name_of(path);
        Self {
            id: DocumentId::from_path(path),
            extension: extension_of(&name),
            name,
            content,
            path: Some(path.to_path_buf()),
            dirty: false,
            version: 0,
        }
    }

    pub fn untitled(id: DocumentId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            content: String::new(),
            path: None,
            extension: extension_of(name),
            dirty: false,
            version: 0,
        }
    }

    pub fn language(&self) -> LanguageId {
        LanguageId::from_extension(&self.extension)
    }
}

impl Keyed for OpenDocument {
    type Key = DocumentId;

    fn key(&self) -> &DocumentId {
        &self.id
    }
}

/// Field-level update for [`DocumentRegistry::open_or_focus`]. Fields left as
/// `None` keep their current value on an existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub id: Option<DocumentId>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub path: Option<Option<PathBuf>>,
    pub extension: Option<String>,
}

impl DocumentPatch {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn path(mut self, path: Option<PathBuf>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    fn apply_to(self, doc: &mut OpenDocument) {
        if let Some(name) = self.name {
            doc.name = name;
        }
        if let Some(content) = self.content {
            if doc.content != content {
                doc.content = content;
                doc.version = doc.version.wrapping_add(1);
            }
        }
        if let Some(path) = self.path {
            doc.path = path;
        }
        if let Some(extension) = self.extension {
            doc.extension = extension;
        }
    }
}

impl From<OpenDocument> for DocumentPatch {
    fn from(doc: OpenDocument) -> Self {
        Self {
            id: Some(doc.id),
            name: Some(doc.name),
            content: Some(doc.content),
            path: Some(doc.path),
            extension: Some(doc.extension),
        }
    }
}

#[derive(Debug, Default)]
pub struct DocumentRegistry {
    docs: ActiveList<OpenDocument>,
    next_untitled: u64,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges into an existing entry (keeping its position) or appends a new
    /// one. Either way the document ends up active.
    pub fn open_or_focus(&mut self, patch: DocumentPatch) -> bool {
        let Some(id) = patch.id.clone() else {
            return false;
        };

        if let Some(existing) = self.docs.get_mut(&id) {
            let before = existing.clone();
            patch.apply_to(existing);
            let merged = *existing != before;
            let focused = self.docs.set_active(&id);
            return merged || focused;
        }

        let mut doc = OpenDocument {
            id: id.clone(),
            name: String::new(),
            content: String::new(),
            path: None,
            extension: String::new(),
            dirty: false,
            version: 0,
        };
        patch.apply_to(&mut doc);
        if doc.name.is_empty() {
            doc.name = doc
                .path
                .as_deref()
                .map(file_name_of)
                .unwrap_or_else(|| id.to_string());
        }
        if doc.extension.is_empty() {
            doc.extension = extension_of(&doc.name);
        }
        tracing::debug!(id = %id, "document opened");
        self.docs.push_active(doc)
    }

    pub fn close(&mut self, id: &DocumentId) -> bool {
        let removed = self.docs.remove(id).is_some();
        if removed {
            tracing::debug!(id = %id, active = ?self.docs.active_key(), "document closed");
        }
        removed
    }

    pub fn set_active(&mut self, id: &DocumentId) -> bool {
        self.docs.set_active(id)
    }

    pub fn update_content(&mut self, id: &DocumentId, text: String) -> bool {
        let Some(doc) = self.docs.get_mut(id) else {
            return false;
        };
        doc.content = text;
        doc.dirty = true;
        doc.version = doc.version.wrapping_add(1);
        true
    }

    /// Clears `dirty` if nothing was edited since `version` was written.
    pub fn mark_saved(&mut self, id: &DocumentId, version: u64) -> bool {
        match self.docs.get_mut(id) {
            Some(doc) if doc.dirty && doc.version == version => {
                doc.dirty = false;
                true
            }
            _ => false,
        }
    }

    /// "Save as": the document under `old` is replaced in place by `doc`,
    /// which carries a new id. The old id is gone afterwards.
    pub fn replace_id(&mut self, old: &DocumentId, doc: OpenDocument) -> bool {
        let new_id = doc.id.clone();
        let replaced = self.docs.replace(old, doc);
        if replaced {
            tracing::debug!(from = %old, to = %new_id, "document re-keyed");
        }
        replaced
    }

    pub fn allocate_untitled_id(&mut self) -> DocumentId {
        loop {
            self.next_untitled = self.next_untitled.saturating_add(1);
            let id = DocumentId::new(format!("{UNTITLED_PREFIX}{}", self.next_untitled));
            if !self.docs.contains(&id) {
                return id;
            }
        }
    }

    pub fn active_document(&self) -> Option<&OpenDocument> {
        self.docs.active()
    }

    pub fn active_id(&self) -> Option<&DocumentId> {
        self.docs.active_key()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&OpenDocument> {
        self.docs.get(id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.docs.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenDocument> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Text after the last `.`, or empty when there is none.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
        _ => String::new(),
    }
}

/// New-file names need a non-empty extension.
pub fn has_valid_extension(name: &str) -> bool {
    let name = name.trim();
    match name.rsplit_once('.') {
        Some((_, ext)) => !ext.is_empty(),
        None => false,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/documents.rs"]
mod tests;
