//! Open-file contexts and the table that tracks them.
//!
//! Every successful create/open registers an [`OpenContext`] and hands the
//! caller a numeric id. Contexts store the path, never the node, so a node
//! removed or replaced in the store is resolved afresh on every call.
//!
//! # Handle Lifecycle
//!
//! 1. **Insert**: `create_file` registers a context under a fresh id
//! 2. **Get/GetMut**: verbs look the context up, renames update its path
//! 3. **Remove**: `close_file` drops the context

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::{Ref, RefMut};

/// State attached to one open handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenContext {
    /// Store path the handle refers to. Follows the node across renames
    /// issued through any handle.
    pub path: String,
    /// True when the handle was opened (or promoted) as a directory.
    pub is_directory: bool,
    /// Remove the node when the handle is cleaned up.
    pub delete_on_close: bool,
}

impl OpenContext {
    /// Creates a context for `path`.
    pub fn new(path: impl Into<String>, is_directory: bool, delete_on_close: bool) -> Self {
        Self {
            path: path.into(),
            is_directory,
            delete_on_close,
        }
    }
}

/// Thread-safe handle table with auto-incrementing ids.
///
/// Ids start at 1; 0 is never handed out so it can stand for "no handle".
///
/// ```
/// use memfs_mount::HandleTable;
///
/// let table: HandleTable<String> = HandleTable::new();
/// let id1 = table.insert("file1".to_string());
/// let id2 = table.insert("file2".to_string());
/// assert_ne!(id1, id2);
/// assert_eq!(table.remove(id1), Some("file1".to_string()));
/// ```
#[derive(Debug)]
pub struct HandleTable<V> {
    handles: DashMap<u64, V>,
    next_id: AtomicU64,
}

impl<V> HandleTable<V> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            handles: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Inserts `value` under a fresh id and returns the id.
    pub fn insert(&self, value: V) -> u64 {
        let mut value = Some(value);
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id == 0 {
                continue;
            }
            if let Entry::Vacant(entry) = self.handles.entry(id)
                && let Some(value) = value.take()
            {
                entry.insert(value);
                return id;
            }
        }
    }

    /// Borrows the value for `id`.
    pub fn get(&self, id: u64) -> Option<Ref<'_, u64, V>> {
        self.handles.get(&id)
    }

    /// Mutably borrows the value for `id`.
    pub fn get_mut(&self, id: u64) -> Option<RefMut<'_, u64, V>> {
        self.handles.get_mut(&id)
    }

    /// Removes and returns the value for `id`.
    pub fn remove(&self, id: u64) -> Option<V> {
        self.handles.remove(&id).map(|(_, v)| v)
    }

    /// Returns true if `id` is live.
    pub fn contains(&self, id: u64) -> bool {
        self.handles.contains_key(&id)
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no handle is live.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drops every handle.
    pub fn clear(&self) {
        self.handles.clear();
    }

    /// Applies `f` to every live handle.
    pub fn for_each_mut<F>(&self, mut f: F)
    where
        F: FnMut(u64, &mut V),
    {
        for mut entry in self.handles.iter_mut() {
            let id = *entry.key();
            f(id, entry.value_mut());
        }
    }
}

impl<V> Default for HandleTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Table of open contexts.
pub type OpenTable = HandleTable<OpenContext>;
