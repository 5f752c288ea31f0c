//! Lazily discovered directory tree of the opened root folder.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

use super::services::ports::DirEntryInfo;

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    path: PathBuf,
    kind: NodeKind,
    /// `None` until the first listing lands. Files stay `None`.
    children: Option<Vec<NodeId>>,
}

/// Owned snapshot of one node and whatever part of its subtree is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub children: Option<Vec<DirectoryNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: u16,
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub expanded: bool,
    pub loading: bool,
    /// Expanded directory whose cached listing is empty.
    pub empty: bool,
}

/// A listing the tree wants performed. `generation` ties the reply to the
/// tree that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub generation: u64,
    pub path: PathBuf,
}

/// An outstanding root listing. Only the latest one may install a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRequest {
    pub token: u64,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct DirectoryTree {
    arena: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
    root_path: Option<PathBuf>,
    id_by_path: FxHashMap<PathBuf, NodeId>,
    expanded: FxHashSet<NodeId>,
    loading: FxHashSet<NodeId>,
    generation: u64,
    root_requests: u64,
    pending_root: Option<RootRequest>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_open(&self) -> bool {
        self.root_path.is_some()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn pending_root(&self) -> Option<&RootRequest> {
        self.pending_root.as_ref()
    }

    /// Starts opening `path`. Any earlier root request is superseded; the
    /// current tree stays until the reply lands.
    pub fn request_root(&mut self, path: PathBuf) -> RootRequest {
        self.root_requests = self.root_requests.wrapping_add(1);
        let request = RootRequest {
            token: self.root_requests,
            path,
        };
        self.pending_root = Some(request.clone());
        request
    }

    /// Installs the listing for the pending root request. Replies for a
    /// superseded or cancelled request are dropped.
    pub fn apply_root_listing(
        &mut self,
        token: u64,
        path: &Path,
        entries: Vec<DirEntryInfo>,
    ) -> bool {
        if !self.take_pending_root(token, path) {
            return false;
        }
        self.set_root(path.to_path_buf(), entries)
    }

    /// Settles a failed root request. The current tree is left alone.
    pub fn apply_root_error(&mut self, token: u64, path: &Path) -> bool {
        self.take_pending_root(token, path)
    }

    fn take_pending_root(&mut self, token: u64, path: &Path) -> bool {
        match &self.pending_root {
            Some(pending) if pending.token == token && pending.path == path => {
                self.pending_root = None;
                true
            }
            _ => {
                tracing::debug!(
                    path = %path.display(),
                    token,
                    "dropping stale root listing"
                );
                false
            }
        }
    }

    /// Replaces the whole tree. Nothing from the previous root survives.
    pub fn set_root(&mut self, root_path: PathBuf, entries: Vec<DirEntryInfo>) -> bool {
        self.reset();
        tracing::debug!(
            root = %root_path.display(),
            entries = entries.len(),
            generation = self.generation,
            "directory tree root set"
        );
        self.root_path = Some(root_path);
        self.roots = self.insert_entries(entries);
        true
    }

    /// Drops the tree and cancels any root request still in flight.
    pub fn clear(&mut self) -> bool {
        let had_pending = self.pending_root.take().is_some();
        let had_tree = self.root_path.is_some() || !self.arena.is_empty();
        self.reset();
        had_tree || had_pending
    }

    fn reset(&mut self) {
        self.arena.clear();
        self.roots.clear();
        self.root_path = None;
        self.id_by_path.clear();
        self.expanded.clear();
        self.loading.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Expands or collapses a directory. Only the first expansion of an
    /// uncached directory produces a listing request, and the in-flight marker
    /// is set before it is returned so repeated toggles stay quiet.
    pub fn toggle(&mut self, path: &Path) -> (bool, Option<ListingRequest>) {
        let Some(id) = self.id_by_path.get(path).copied() else {
            return (false, None);
        };
        let Some(node) = self.arena.get(id) else {
            return (false, None);
        };
        if node.kind != NodeKind::Dir {
            return (false, None);
        }

        if self.expanded.remove(&id) {
            return (true, None);
        }

        if node.children.is_some() {
            self.expanded.insert(id);
            return (true, None);
        }

        if !self.loading.insert(id) {
            tracing::trace!(path = %path.display(), "listing already in flight");
            return (false, None);
        }

        (
            true,
            Some(ListingRequest {
                generation: self.generation,
                path: path.to_path_buf(),
            }),
        )
    }

    pub fn apply_listing(
        &mut self,
        generation: u64,
        path: &Path,
        entries: Vec<DirEntryInfo>,
    ) -> bool {
        let Some(id) = self.pending_node(generation, path) else {
            return false;
        };

        let children = self.insert_entries(entries);
        if let Some(node) = self.arena.get_mut(id) {
            node.children = Some(children);
        }
        self.loading.remove(&id);
        self.expanded.insert(id);
        true
    }

    /// A failed listing caches an empty folder instead of retrying.
    pub fn apply_listing_error(&mut self, generation: u64, path: &Path) -> bool {
        let Some(id) = self.pending_node(generation, path) else {
            return false;
        };

        if let Some(node) = self.arena.get_mut(id) {
            node.children = Some(Vec::new());
        }
        self.loading.remove(&id);
        self.expanded.insert(id);
        true
    }

    fn pending_node(&self, generation: u64, path: &Path) -> Option<NodeId> {
        if generation != self.generation {
            tracing::debug!(
                path = %path.display(),
                generation,
                current = self.generation,
                "dropping listing for a discarded tree"
            );
            return None;
        }
        let id = self.id_by_path.get(path).copied()?;
        let node = self.arena.get(id)?;
        if node.kind != NodeKind::Dir || node.children.is_some() {
            return None;
        }
        Some(id)
    }

    fn insert_entries(&mut self, mut entries: Vec<DirEntryInfo>) -> Vec<NodeId> {
        sort_entries(&mut entries);

        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.id_by_path.contains_key(&entry.path) {
                continue;
            }
            let kind = if entry.is_dir {
                NodeKind::Dir
            } else {
                NodeKind::File
            };
            let id = self.arena.insert(Node {
                name: entry.name,
                path: entry.path.clone(),
                kind,
                children: None,
            });
            self.id_by_path.insert(entry.path, id);
            ids.push(id);
        }
        ids
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.id_by_path.contains_key(path)
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.lookup(path)
            .map(|node| node.kind == NodeKind::Dir)
            .unwrap_or(false)
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.id_by_path
            .get(path)
            .is_some_and(|id| self.expanded.contains(id))
    }

    pub fn is_loading(&self, path: &Path) -> bool {
        self.id_by_path
            .get(path)
            .is_some_and(|id| self.loading.contains(id))
    }

    pub fn children_cached(&self, path: &Path) -> bool {
        self.lookup(path)
            .is_some_and(|node| node.children.is_some())
    }

    fn lookup(&self, path: &Path) -> Option<&Node> {
        let id = self.id_by_path.get(path)?;
        self.arena.get(*id)
    }

    pub fn node(&self, path: &Path) -> Option<DirectoryNode> {
        let id = self.id_by_path.get(path)?;
        self.snapshot(*id)
    }

    pub fn roots(&self) -> Vec<DirectoryNode> {
        self.roots
            .iter()
            .filter_map(|id| self.snapshot(*id))
            .collect()
    }

    fn snapshot(&self, id: NodeId) -> Option<DirectoryNode> {
        let node = self.arena.get(id)?;
        let children = node.children.as_ref().map(|ids| {
            ids.iter()
                .filter_map(|child| self.snapshot(*child))
                .collect()
        });
        Some(DirectoryNode {
            name: node.name.clone(),
            path: node.path.clone(),
            is_directory: node.kind == NodeKind::Dir,
            children,
        })
    }

    /// Rows in display order, descending only into expanded directories.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, u16)> =
            self.roots.iter().rev().map(|id| (*id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            let expanded = self.expanded.contains(&id);
            rows.push(TreeRow {
                depth,
                name: node.name.clone(),
                path: node.path.clone(),
                is_dir: node.kind == NodeKind::Dir,
                expanded,
                loading: self.loading.contains(&id),
                empty: expanded && node.children.as_ref().is_some_and(|c| c.is_empty()),
            });

            if expanded {
                if let Some(children) = &node.children {
                    for child in children.iter().rev() {
                        stack.push((*child, depth.saturating_add(1)));
                    }
                }
            }
        }

        rows
    }
}

/// Directories first, then case-insensitive by name.
pub fn sort_entries(entries: &mut [DirEntryInfo]) {
    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/explorer.rs"]
mod tests;
