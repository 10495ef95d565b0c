//! Path-addressed node store.
//!
//! # Design
//!
//! The store keeps three maps that together describe the tree:
//! - `path_to_id`: full path → node identity (one entry per live node)
//! - `nodes`: identity → node (the arena holding the owning `Arc`)
//! - `children`: directory path → ordered set of child identities
//!
//! All three live behind one re-entrant structural lock so that a caller
//! holding [`Store::lock`] can chain several operations atomically. Content
//! and metadata live on the nodes themselves and never take this lock.
//!
//! # Invariants
//!
//! - A node appears in `path_to_id` under exactly its current name.
//! - A node appears in exactly one child set, keyed by its parent path.
//! - A directory's own path is a key of `children` while it exists.
//! - The root (`/`) always exists, is a directory and is never removed or
//!   renamed.
//!
//! [`Store::check_consistency`] verifies all of them.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::attributes::FileAttributes;
use crate::error::{FsError, FsResult};
use crate::node::{FileNode, NodeKind, UNASSIGNED_ID};
use crate::path;
use crate::security::SecurityDescriptor;

/// Identity carried by the root node.
pub const ROOT_ID: u64 = 1;

/// First identity handed out to an inserted node.
pub const FIRST_ID: u64 = 2;

/// The structural index. Only ever touched with the structural lock held.
#[derive(Debug)]
struct StoreIndex {
    path_to_id: HashMap<String, u64>,
    nodes: HashMap<u64, Arc<FileNode>>,
    children: HashMap<String, BTreeSet<u64>>,
}

impl StoreIndex {
    fn with_root(root: Arc<FileNode>) -> Self {
        let mut index = Self {
            path_to_id: HashMap::new(),
            nodes: HashMap::new(),
            children: HashMap::new(),
        };
        index.path_to_id.insert(path::ROOT.to_string(), ROOT_ID);
        index.nodes.insert(ROOT_ID, root);
        index.children.insert(path::ROOT.to_string(), BTreeSet::new());
        index
    }

    fn lookup(&self, path: &str) -> Option<(u64, &Arc<FileNode>)> {
        let id = *self.path_to_id.get(path)?;
        self.nodes.get(&id).map(|node| (id, node))
    }

    fn lookup_cloned(&self, path: &str) -> Option<(u64, Arc<FileNode>)> {
        self.lookup(path).map(|(id, node)| (id, Arc::clone(node)))
    }

    fn detach_from_parent(&mut self, path: &str, id: u64) {
        if let Some(parent) = path::parent(path)
            && let Some(siblings) = self.children.get_mut(parent)
        {
            siblings.remove(&id);
        }
    }
}

/// Guard returned by [`Store::lock`].
///
/// While it lives, other threads cannot change the tree. The owning thread
/// may keep calling store methods; the lock is re-entrant.
#[must_use = "the structural lock is released when the guard is dropped"]
pub struct StoreGuard<'a> {
    _guard: ReentrantMutexGuard<'a, RefCell<StoreIndex>>,
}

/// Aggregate counters over the live tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Live nodes including the root.
    pub nodes: usize,
    pub files: usize,
    pub directories: usize,
    /// Sum of file content lengths.
    pub bytes: u64,
}

/// A broken index invariant found by [`Store::check_consistency`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("root is missing or not a directory")]
    BadRoot,

    #[error("path {path} maps to missing node {id}")]
    DanglingPath { path: String, id: u64 },

    #[error("node {id} is indexed under {indexed} but named {actual}")]
    NameMismatch {
        id: u64,
        indexed: String,
        actual: String,
    },

    #[error("node {id} is in the arena but has no path entry")]
    Unindexed { id: u64 },

    #[error("node {path} is not listed by its parent")]
    NotInParent { path: String },

    #[error("node {id} is listed under {listed} which is not its parent")]
    WrongParent { id: u64, listed: String },

    #[error("directory {path} has no child set")]
    MissingChildSet { path: String },

    #[error("child set {path} does not belong to a live directory")]
    OrphanChildSet { path: String },
}

/// The in-memory tree of file and directory nodes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use memfs_core::{FileNode, Store};
///
/// let store = Store::new();
/// store.add(Arc::new(FileNode::new_directory("/docs"))).unwrap();
/// store.add(Arc::new(FileNode::new_file("/docs/a.txt"))).unwrap();
///
/// store.move_node("/docs", "/archive", false).unwrap();
/// assert!(store.find("/archive/a.txt").is_some());
/// assert!(store.find("/docs").is_none());
/// ```
pub struct Store {
    index: ReentrantMutex<RefCell<StoreIndex>>,
    root: Arc<FileNode>,
    next_id: AtomicU64,
}

impl Store {
    /// Creates a store whose root carries the default descriptor for the
    /// current process.
    pub fn new() -> Self {
        Self::with_root_security(Some(SecurityDescriptor::for_current_process()))
    }

    /// Creates a store whose root carries `security`.
    pub fn with_root_security(security: Option<SecurityDescriptor>) -> Self {
        let root = Arc::new(FileNode::new(
            path::ROOT,
            NodeKind::Directory,
            FileAttributes::DIRECTORY,
            security,
        ));
        root.assign_identity(ROOT_ID);
        Self {
            index: ReentrantMutex::new(RefCell::new(StoreIndex::with_root(Arc::clone(&root)))),
            root,
            next_id: AtomicU64::new(FIRST_ID),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Takes the structural lock for the duration of the returned guard.
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            _guard: self.index.lock(),
        }
    }

    /// Returns the root node.
    pub fn root(&self) -> Arc<FileNode> {
        Arc::clone(&self.root)
    }

    // ------------------------------------------------------------------
    // Add / Find / ListFolder
    // ------------------------------------------------------------------

    /// Inserts `node` under its current name.
    ///
    /// The parent directory must already exist. Adding over a live path
    /// replaces the previous node (last writer wins); a replaced directory
    /// hands its children to a new directory, or drops them if the new node
    /// is a file.
    pub fn add(&self, node: Arc<FileNode>) -> FsResult<()> {
        let guard = self.index.lock();
        let mut index = guard.borrow_mut();
        self.add_locked(&mut index, node)
    }

    fn add_locked(&self, index: &mut StoreIndex, node: Arc<FileNode>) -> FsResult<()> {
        let name = node.name();
        let Some(parent) = path::parent(&name) else {
            warn!(path = %name, "Add: refusing to replace root");
            return Err(FsError::AccessDenied(name));
        };
        if !index.children.contains_key(parent) {
            warn!(path = %name, parent = %parent, "Add: parent directory does not exist");
            return Err(FsError::ParentPathNotFound(name));
        }

        let id = if node.identity() == UNASSIGNED_ID {
            node.assign_identity(self.allocate_id())
        } else {
            let id = node.identity();
            if index
                .nodes
                .get(&id)
                .is_some_and(|occupant| !Arc::ptr_eq(occupant, &node))
            {
                warn!(path = %name, id, "Add: identity already held by another node");
                return Err(FsError::AccessDenied(name));
            }
            self.next_id.fetch_max(id + 1, Ordering::Relaxed);
            id
        };

        if let Some((old_id, old)) = index.lookup_cloned(&name)
            && old_id != id
        {
            index.detach_from_parent(&name, old_id);
            index.nodes.remove(&old_id);
            if old.is_directory() && !node.is_directory() {
                let descendants = index
                    .children
                    .get(&name)
                    .map(|kids| kids.iter().copied().collect::<Vec<_>>())
                    .unwrap_or_default();
                for child in descendants {
                    Self::remove_locked(index, child);
                }
                index.children.remove(&name);
            }
            debug!(path = %name, old_id, new_id = id, "Add: replaced existing node");
        }

        if node.is_directory() {
            index.children.entry(name.clone()).or_default();
        }
        let parent = parent.to_string();
        index.path_to_id.insert(name.clone(), id);
        index.nodes.insert(id, node);
        index.children.entry(parent.clone()).or_default().insert(id);

        debug!(path = %name, parent = %parent, id, "Added node");
        Ok(())
    }

    /// Looks up the node at `path`.
    pub fn find(&self, path: &str) -> Option<Arc<FileNode>> {
        let guard = self.index.lock();
        let index = guard.borrow();
        index.lookup(path).map(|(_, node)| Arc::clone(node))
    }

    /// Returns true if a node lives at `path`.
    pub fn contains(&self, path: &str) -> bool {
        let guard = self.index.lock();
        guard.borrow().path_to_id.contains_key(path)
    }

    /// Snapshot of the children of `path`, ordered by identity.
    ///
    /// Empty when `path` is not a known directory.
    pub fn list_folder(&self, path: &str) -> Vec<Arc<FileNode>> {
        let guard = self.index.lock();
        let index = guard.borrow();
        index
            .children
            .get(path)
            .map(|kids| {
                kids.iter()
                    .filter_map(|id| index.nodes.get(id).map(Arc::clone))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every node strictly below `path`, each listed after its parent.
    pub fn descendants(&self, path: &str) -> Vec<Arc<FileNode>> {
        let guard = self.index.lock();
        let index = guard.borrow();
        let mut out = Vec::new();
        let mut stack = vec![path.to_string()];
        while let Some(dir) = stack.pop() {
            let Some(kids) = index.children.get(&dir) else {
                continue;
            };
            for id in kids.iter().rev() {
                if let Some(node) = index.nodes.get(id) {
                    if node.is_directory() {
                        stack.push(node.name());
                    }
                    out.push(Arc::clone(node));
                }
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------

    /// Removes the node at `path` and, for directories, its whole subtree.
    ///
    /// No-op when nothing lives at `path` or when `path` is the root.
    /// Emptiness is not checked here. Returns the number of nodes removed.
    pub fn remove(&self, path: &str) -> usize {
        if path::is_root(path) {
            warn!("Remove: refusing to remove root");
            return 0;
        }
        let guard = self.index.lock();
        let mut index = guard.borrow_mut();
        let Some(id) = index.path_to_id.get(path).copied() else {
            trace!(path = %path, "Remove: nothing to remove");
            return 0;
        };
        let removed = Self::remove_locked(&mut index, id);
        debug!(path = %path, removed, "Removed node");
        removed
    }

    /// Removes `node` if it is still the live node under its name.
    pub fn remove_node(&self, node: &FileNode) -> usize {
        let id = node.identity();
        if id == ROOT_ID {
            warn!("Remove: refusing to remove root");
            return 0;
        }
        let guard = self.index.lock();
        let mut index = guard.borrow_mut();
        let live = index
            .nodes
            .get(&id)
            .is_some_and(|existing| std::ptr::eq(Arc::as_ptr(existing), node));
        if !live {
            trace!(id, "Remove: node already detached");
            return 0;
        }
        let removed = Self::remove_locked(&mut index, id);
        debug!(path = %node.name(), removed, "Removed node");
        removed
    }

    fn remove_locked(index: &mut StoreIndex, id: u64) -> usize {
        let Some(node) = index.nodes.remove(&id) else {
            return 0;
        };
        let name = node.name();
        if index.path_to_id.get(&name) == Some(&id) {
            index.path_to_id.remove(&name);
        }
        index.detach_from_parent(&name, id);

        let mut removed = 1;
        if node.is_directory() {
            let kids: Vec<u64> = index
                .children
                .get(&name)
                .map(|kids| kids.iter().copied().collect())
                .unwrap_or_default();
            for child in kids {
                removed += Self::remove_locked(index, child);
            }
            index.children.remove(&name);
        }
        removed
    }

    // ------------------------------------------------------------------
    // Move
    // ------------------------------------------------------------------

    /// Renames `old_path` to `new_path`, carrying a directory's subtree.
    ///
    /// Checks, in order:
    /// 1. `old_path` must exist (`NotFound`)
    /// 2. an existing destination needs `replace_existing` (`NameCollision`)
    /// 3. a read-only destination cannot be replaced (`AccessDenied`)
    /// 4. a directory can neither replace nor be replaced (`AccessDenied`)
    /// 5. the root and moves into the source's own subtree are refused
    ///    (`AccessDenied`)
    /// 6. the destination's parent must be a directory (`ParentPathNotFound`)
    ///
    /// Moving a path onto itself is a no-op once the collision check passes.
    ///
    /// A directory's children are moved one by one after the directory
    /// itself. The first failing child aborts the move and is returned; the
    /// children moved so far stay moved.
    pub fn move_node(&self, old_path: &str, new_path: &str, replace_existing: bool) -> FsResult<()> {
        let guard = self.index.lock();
        let mut index = guard.borrow_mut();
        self.move_locked(&mut index, old_path, new_path, replace_existing)?;
        debug!(from = %old_path, to = %new_path, "Moved node");
        Ok(())
    }

    fn move_locked(
        &self,
        index: &mut StoreIndex,
        old_path: &str,
        new_path: &str,
        replace_existing: bool,
    ) -> FsResult<()> {
        let Some((source_id, source)) = index.lookup_cloned(old_path) else {
            return Err(FsError::NotFound(old_path.to_string()));
        };
        let dest = index.lookup_cloned(new_path);

        if let Some((_, dest_node)) = &dest {
            if !replace_existing {
                return Err(FsError::NameCollision(new_path.to_string()));
            }
            if old_path == new_path {
                return Ok(());
            }
            if dest_node.attributes().is_read_only() {
                return Err(FsError::AccessDenied(new_path.to_string()));
            }
            if source.is_directory() || dest_node.is_directory() {
                return Err(FsError::AccessDenied(new_path.to_string()));
            }
        }
        if path::is_root(old_path) || path::is_descendant(new_path, old_path) {
            return Err(FsError::AccessDenied(new_path.to_string()));
        }

        let Some(new_parent) = path::parent(new_path) else {
            return Err(FsError::AccessDenied(new_path.to_string()));
        };
        if !index.children.contains_key(new_parent) {
            warn!(path = %new_path, parent = %new_parent, "Move: destination parent does not exist");
            return Err(FsError::ParentPathNotFound(new_path.to_string()));
        }

        if let Some((dest_id, _)) = dest {
            Self::remove_locked(index, dest_id);
        }

        source.rename(new_path);
        if index.path_to_id.get(old_path) == Some(&source_id) {
            index.path_to_id.remove(old_path);
        }
        index.detach_from_parent(old_path, source_id);
        index.path_to_id.insert(new_path.to_string(), source_id);
        index
            .children
            .entry(new_parent.to_string())
            .or_default()
            .insert(source_id);

        if source.is_directory() {
            index.children.entry(new_path.to_string()).or_default();
            let kids: Vec<String> = index
                .children
                .get(old_path)
                .map(|kids| {
                    kids.iter()
                        .filter_map(|id| index.nodes.get(id).map(|node| node.name()))
                        .collect()
                })
                .unwrap_or_default();
            for child_old in kids {
                let child_new = path::join(new_path, path::file_name(&child_old));
                if let Err(err) = self.move_locked(index, &child_old, &child_new, replace_existing) {
                    warn!(
                        from = %child_old,
                        to = %child_new,
                        replace_existing,
                        error = %err,
                        "Move: child move failed, subtree left partially moved"
                    );
                    return Err(err);
                }
            }
            index.children.remove(old_path);
        }

        trace!(from = %old_path, to = %new_path, id = source_id, "Move step complete");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Counts live nodes and stored bytes.
    pub fn stats(&self) -> StoreStats {
        let guard = self.index.lock();
        let index = guard.borrow();
        let mut stats = StoreStats {
            nodes: index.nodes.len(),
            ..StoreStats::default()
        };
        for node in index.nodes.values() {
            if node.is_directory() {
                stats.directories += 1;
            } else {
                stats.files += 1;
                stats.bytes += node.size();
            }
        }
        stats
    }

    /// Verifies every structural invariant, returning the first violation.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        let guard = self.index.lock();
        let index = guard.borrow();

        match index.lookup(path::ROOT) {
            Some((ROOT_ID, root)) if Arc::ptr_eq(root, &self.root) && root.is_directory() => {}
            _ => return Err(ConsistencyError::BadRoot),
        }

        for (indexed, &id) in &index.path_to_id {
            let Some(node) = index.nodes.get(&id) else {
                return Err(ConsistencyError::DanglingPath {
                    path: indexed.clone(),
                    id,
                });
            };
            let actual = node.name();
            if &actual != indexed {
                return Err(ConsistencyError::NameMismatch {
                    id,
                    indexed: indexed.clone(),
                    actual,
                });
            }
            if node.is_directory() && !index.children.contains_key(indexed) {
                return Err(ConsistencyError::MissingChildSet {
                    path: indexed.clone(),
                });
            }
            if let Some(parent) = path::parent(indexed) {
                let listed = index
                    .children
                    .get(parent)
                    .is_some_and(|kids| kids.contains(&id));
                if !listed {
                    return Err(ConsistencyError::NotInParent {
                        path: indexed.clone(),
                    });
                }
            }
        }

        for (&id, node) in &index.nodes {
            if index.path_to_id.get(&node.name()) != Some(&id) {
                return Err(ConsistencyError::Unindexed { id });
            }
        }

        for (dir, kids) in &index.children {
            match index.lookup(dir) {
                Some((_, node)) if node.is_directory() => {}
                _ => {
                    return Err(ConsistencyError::OrphanChildSet { path: dir.clone() });
                }
            }
            for id in kids {
                let parent_ok = index
                    .nodes
                    .get(id)
                    .is_some_and(|node| path::parent(&node.name()) == Some(dir.as_str()));
                if !parent_ok {
                    return Err(ConsistencyError::WrongParent {
                        id: *id,
                        listed: dir.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("Store")
            .field("nodes", &stats.nodes)
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn dir(path: &str) -> Arc<FileNode> {
        Arc::new(FileNode::new_directory(path))
    }

    fn file(path: &str) -> Arc<FileNode> {
        Arc::new(FileNode::new_file(path))
    }

    fn names(nodes: &[Arc<FileNode>]) -> Vec<String> {
        let mut names: Vec<String> = nodes.iter().map(|n| n.name()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_store_has_root() {
        let store = Store::new();
        let root = store.find("/").expect("root exists");
        assert!(root.is_directory());
        assert_eq!(root.identity(), ROOT_ID);
        assert!(root.security().is_some());
        assert!(store.list_folder("/").is_empty());
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_first_added_node_gets_first_id() {
        let store = Store::new();
        let a = file("/a");
        let b = file("/b");
        store.add(Arc::clone(&a)).unwrap();
        store.add(Arc::clone(&b)).unwrap();
        assert_eq!(a.identity(), FIRST_ID);
        assert_eq!(b.identity(), FIRST_ID + 1);
    }

    #[test]
    fn test_add_keeps_preassigned_identity() {
        let store = Store::new();
        let node = file("/a");
        node.assign_identity(77);
        store.add(Arc::clone(&node)).unwrap();
        assert_eq!(node.identity(), 77);
        assert_eq!(store.find("/a").unwrap().identity(), 77);

        // Allocation continues past the preassigned identity.
        let next = file("/b");
        store.add(Arc::clone(&next)).unwrap();
        assert_eq!(next.identity(), 78);
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_node_from_another_store_does_not_collide() {
        let first = Store::new();
        let moved = file("/x");
        first.add(Arc::clone(&moved)).unwrap();
        assert_eq!(moved.identity(), FIRST_ID);

        let second = Store::new();
        second.add(Arc::clone(&moved)).unwrap();
        let fresh = file("/y");
        second.add(Arc::clone(&fresh)).unwrap();

        assert_ne!(fresh.identity(), moved.identity());
        assert_eq!(second.find("/x").unwrap().name(), "/x");
        assert_eq!(second.find("/y").unwrap().name(), "/y");
        second.check_consistency().unwrap();
    }

    #[test]
    fn test_add_rejects_identity_held_by_other_node() {
        let store = Store::new();
        let live = file("/a");
        store.add(Arc::clone(&live)).unwrap();

        let impostor = file("/b");
        impostor.assign_identity(live.identity());
        let err = store.add(impostor).unwrap_err();
        assert!(matches!(err, FsError::AccessDenied(_)));
        assert!(store.find("/b").is_none());
        assert_eq!(store.find("/a").unwrap().name(), "/a");
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_readd_same_node_is_allowed() {
        let store = Store::new();
        let node = file("/a");
        store.add(Arc::clone(&node)).unwrap();
        store.add(Arc::clone(&node)).unwrap();
        assert_eq!(store.list_folder("/").len(), 1);
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_add_root_is_denied() {
        let store = Store::new();
        let err = store.add(dir("/")).unwrap_err();
        assert!(matches!(err, FsError::AccessDenied(_)));
        assert_eq!(store.root().identity(), ROOT_ID);
    }

    #[test]
    fn test_add_over_file_replaces_it() {
        let store = Store::new();
        let first = file("/a");
        store.add(Arc::clone(&first)).unwrap();
        let second = file("/a");
        store.add(Arc::clone(&second)).unwrap();

        let found = store.find("/a").unwrap();
        assert!(Arc::ptr_eq(&found, &second));
        assert_eq!(store.list_folder("/").len(), 1);
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_add_file_over_directory_drops_subtree() {
        let store = Store::new();
        store.add(dir("/d")).unwrap();
        store.add(file("/d/x")).unwrap();
        store.add(file("/d")).unwrap();

        assert!(!store.find("/d").unwrap().is_directory());
        assert!(store.find("/d/x").is_none());
        assert!(store.list_folder("/d").is_empty());
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_add_directory_over_directory_adopts_children() {
        let store = Store::new();
        store.add(dir("/d")).unwrap();
        store.add(file("/d/x")).unwrap();
        store.add(dir("/d")).unwrap();

        assert_eq!(names(&store.list_folder("/d")), vec!["/d/x"]);
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_root_is_noop() {
        let store = Store::new();
        store.add(file("/a")).unwrap();
        assert_eq!(store.remove("/"), 0);
        let root = store.root();
        assert_eq!(store.remove_node(&root), 0);
        assert!(store.find("/a").is_some());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let store = Store::new();
        assert_eq!(store.remove("/missing"), 0);
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_node_ignores_detached_node() {
        let store = Store::new();
        let old = file("/a");
        store.add(Arc::clone(&old)).unwrap();
        store.add(file("/a")).unwrap();
        assert_eq!(store.remove_node(&old), 0);
        assert!(store.find("/a").is_some());
    }

    #[test]
    fn test_remove_counts_subtree() {
        let store = Store::new();
        store.add(dir("/d")).unwrap();
        store.add(dir("/d/e")).unwrap();
        store.add(file("/d/e/f")).unwrap();
        store.add(file("/d/g")).unwrap();
        assert_eq!(store.remove("/d"), 4);
        assert_eq!(store.stats().nodes, 1);
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_move_onto_itself() {
        let store = Store::new();
        store.add(file("/a")).unwrap();
        assert!(matches!(
            store.move_node("/a", "/a", false),
            Err(FsError::NameCollision(_))
        ));
        store.move_node("/a", "/a", true).unwrap();
        assert!(store.find("/a").is_some());
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_move_root_denied() {
        let store = Store::new();
        store.add(dir("/d")).unwrap();
        assert!(matches!(
            store.move_node("/", "/d/root", false),
            Err(FsError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_move_into_own_subtree_denied() {
        let store = Store::new();
        store.add(dir("/d")).unwrap();
        store.add(dir("/d/e")).unwrap();
        assert!(matches!(
            store.move_node("/d", "/d/e/d", false),
            Err(FsError::AccessDenied(_))
        ));
        assert!(store.find("/d/e").is_some());
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_move_within_same_folder() {
        let store = Store::new();
        store.add(file("/a")).unwrap();
        store.move_node("/a", "/b", false).unwrap();
        assert_eq!(names(&store.list_folder("/")), vec!["/b"]);
        store.check_consistency().unwrap();
    }

    #[test]
    fn test_move_keeps_identity_and_content() {
        let store = Store::new();
        let node = file("/a");
        node.write(0, b"payload", false).unwrap();
        store.add(Arc::clone(&node)).unwrap();
        let id = node.identity();

        store.add(dir("/d")).unwrap();
        store.move_node("/a", "/d/a", false).unwrap();

        let moved = store.find("/d/a").unwrap();
        assert_eq!(moved.identity(), id);
        assert_eq!(moved.read(0, 7), b"payload");
    }

    #[test]
    fn test_descendants_pre_order() {
        let store = Store::new();
        store.add(dir("/a")).unwrap();
        store.add(file("/a/x")).unwrap();
        store.add(dir("/b")).unwrap();
        let all = store.descendants("/");
        assert_eq!(names(&all), vec!["/a", "/a/x", "/b"]);
        assert_eq!(store.descendants("/a").len(), 1);
        assert!(store.descendants("/missing").is_empty());
    }

    #[test]
    fn test_stats() {
        let store = Store::new();
        store.add(dir("/d")).unwrap();
        let f = file("/d/f");
        f.write(0, b"12345", false).unwrap();
        store.add(f).unwrap();
        assert_eq!(
            store.stats(),
            StoreStats {
                nodes: 3,
                files: 1,
                directories: 2,
                bytes: 5,
            }
        );
    }

    #[test]
    fn test_lock_is_reentrant() {
        let store = Store::new();
        let _guard = store.lock();
        store.add(file("/a")).unwrap();
        assert!(store.find("/a").is_some());
        let _inner = store.lock();
        assert_eq!(store.remove("/a"), 1);
    }

    #[test]
    fn test_lock_blocks_other_threads() {
        let store = Arc::new(Store::new());
        let guard = store.lock();
        let worker = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add(Arc::new(FileNode::new_file("/t"))))
        };
        assert!(store.find("/t").is_none());
        drop(guard);
        worker.join().unwrap().unwrap();
        assert!(store.find("/t").is_some());
    }

    #[test]
    fn test_concurrent_id_allocation() {
        let store = Arc::new(Store::new());
        let mut handles = vec![];
        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    store
                        .add(Arc::new(FileNode::new_file(format!("/t{t}_{i}"))))
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let ids: BTreeSet<u64> = store.list_folder("/").iter().map(|n| n.identity()).collect();
        assert_eq!(ids.len(), 400);
        assert_eq!(ids.first().copied(), Some(FIRST_ID));
        store.check_consistency().unwrap();
    }
}
