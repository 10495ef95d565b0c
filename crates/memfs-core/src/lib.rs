//! In-memory, path-addressed hierarchical store.
//!
//! This crate is the engine behind an in-memory mountable volume. A verb
//! adapter (see `memfs-mount`) translates platform filesystem calls into
//! operations on a [`Store`].
//!
//! # Components
//!
//! - [`Store`] - path index, directory index and the recursive move
//! - [`FileNode`] - a file or directory with per-field locking
//! - [`FileContent`] - growable byte buffer with paging-write clamping
//! - [`FileAttributes`] - attribute bitmask with Windows bit values
//! - [`FileTime`] / [`FileTimes`] - FILETIME-style timestamps
//! - [`SecurityDescriptor`] - opaque security blob
//! - [`FsError`] - error type shared by every operation
//!
//! # Locking
//!
//! Structural changes (add, remove, move) take the store's re-entrant
//! structural lock. Content reads and writes take only the node's content
//! lock, so I/O on one file never waits on enumeration or renames elsewhere.
//! Lock order is structural, then node name.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use memfs_core::{FileNode, Store};
//!
//! let store = Store::new();
//! let file = Arc::new(FileNode::new_file("/hello.txt"));
//! store.add(Arc::clone(&file)).unwrap();
//!
//! file.write(0, b"Hello", false).unwrap();
//! let found = store.find("/hello.txt").unwrap();
//! assert_eq!(found.read(0, 5), b"Hello");
//! ```

#![deny(unsafe_code)]

pub mod attributes;
pub mod content;
pub mod error;
pub mod node;
pub mod path;
pub mod security;
pub mod store;
pub mod times;

pub use attributes::FileAttributes;
pub use content::FileContent;
pub use error::{FsError, FsResult};
pub use node::{FileNode, NodeKind, UNASSIGNED_ID};
pub use security::SecurityDescriptor;
pub use store::{ConsistencyError, FIRST_ID, ROOT_ID, Store, StoreGuard, StoreStats};
pub use times::{FileTime, FileTimes};
